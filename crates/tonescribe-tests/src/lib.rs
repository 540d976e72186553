//! tonescribe End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the transcription pipeline:
//!
//! - Scenarios: silence, tones, invalid parameters, short input
//! - Interop: encoder output parsed by the `midly` SMF parser
//! - Properties: sequencing, quantization and VLQ invariants (proptest)
//! - **Determinism**: byte-identical output across runs and with progress
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tonescribe-tests
//! ```

pub mod determinism;
pub mod fixtures;
