//! tonescribe CLI library.
//!
//! This crate provides the pieces around the core pipeline: WAV decoding,
//! output naming, and the `convert` and `inspect` commands.

pub mod audio;
pub mod commands;
pub mod output;
