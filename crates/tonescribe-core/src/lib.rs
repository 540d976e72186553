//! tonescribe core - Deterministic Audio-to-Melody MIDI Transcription
//!
//! This crate turns a mono sample buffer into a single-track Standard MIDI
//! File holding a monophonic melody. It estimates one pitch per analysis
//! window, quantizes the contour into a fixed number of levels, collapses
//! runs of equal levels into notes and encodes them with variable-length
//! delta-times.
//!
//! # Pipeline
//!
//! ```text
//! samples -> frames -> pitch contour -> level contour -> note spans -> ticks -> SMF bytes
//! ```
//!
//! # Determinism
//!
//! The pipeline is a pure function of its inputs. The same samples, sample
//! rate and parameters always produce byte-identical output, with or without
//! a progress callback.
//!
//! # Example
//!
//! ```ignore
//! use tonescribe_core::{convert, ConvertParams};
//!
//! let params = ConvertParams::new(12);
//! let smf = convert(&samples, 44_100, &params)?;
//! std::fs::write("melody.mid", smf)?;
//! ```
//!
//! # Module Structure
//!
//! - [`frame`]: Overlapping analysis windows
//! - [`pitch`]: Magnitude-peak pitch estimate per frame
//! - [`quantize`]: Global min/max level quantization
//! - [`sequence`]: Run-length note spans
//! - [`tempo`]: Frame-to-tick mapping
//! - [`smf`]: Standard MIDI File writer and validator
//! - [`convert`]: Pipeline entry points

pub mod convert;
pub mod error;
pub mod frame;
pub mod pitch;
pub mod progress;
pub mod quantize;
pub mod sequence;
pub mod smf;
pub mod tempo;

// Re-export main types
pub use convert::{
    convert, convert_with_progress, transcribe, transcribe_with_progress, ConvertParams,
    Transcription,
};
pub use error::{ConvertError, ConvertResult};
pub use frame::{FrameSource, Frames, DEFAULT_FRAME_SIZE, DEFAULT_HOP};
pub use pitch::estimate_pitch;
pub use progress::Progress;
pub use quantize::{quantize, Quantization};
pub use sequence::{level_to_note, sequence_levels, NoteSequence, NoteSpan, BASE_NOTE};
pub use smf::{encode_spans, SmfFormatError, SmfReport, SmfValidator};
pub use tempo::{TempoMap, TempoPolicy, TEMPO_BPM, TICKS_PER_QUARTER};
