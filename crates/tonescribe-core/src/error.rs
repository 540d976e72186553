//! Error types for the transcription pipeline.

use thiserror::Error;

/// Result type for pipeline operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while converting samples to a MIDI file.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    /// The buffer holds fewer samples than one frame, so no frame was produced.
    #[error("input too short: {samples} samples, need at least {frame_size} for one frame")]
    EmptyInput {
        /// Number of samples supplied.
        samples: usize,
        /// Frame size in samples.
        frame_size: u32,
    },

    /// Every frame was rejected by the audible-range filter.
    #[error("no tonal content detected in {frames} frames")]
    NoPitchDetected {
        /// Number of frames scanned.
        frames: usize,
    },

    /// A parameter is out of range.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// A quantized level maps to a note number outside the MIDI range.
    #[error("level {level} maps to MIDI note {note}, outside 0..=127")]
    NoteRangeOverflow {
        /// Quantized level.
        level: u32,
        /// Computed note number (level + base note).
        note: u64,
    },

    /// The encoder produced an inconsistent byte layout.
    #[error("encoding invariant violated: {message}")]
    EncodingInvariantViolation {
        /// Error message.
        message: String,
    },

    /// The progress callback asked the scan to stop.
    #[error("conversion interrupted after {frames_done} of {frames_total} frames")]
    Interrupted {
        /// Frames analysed before the interruption.
        frames_done: usize,
        /// Total frames in the buffer.
        frames_total: usize,
    },
}

impl ConvertError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an encoding invariant error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::EncodingInvariantViolation {
            message: message.into(),
        }
    }

    /// Stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::EmptyInput { .. } => "CONVERT_001",
            ConvertError::NoPitchDetected { .. } => "CONVERT_002",
            ConvertError::InvalidParameter { .. } => "CONVERT_003",
            ConvertError::NoteRangeOverflow { .. } => "CONVERT_004",
            ConvertError::EncodingInvariantViolation { .. } => "CONVERT_005",
            ConvertError::Interrupted { .. } => "CONVERT_006",
        }
    }

    /// Error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        "convert"
    }

    /// Whether this is the "no tonal content" outcome.
    ///
    /// Atonal or silent input is an expected result that callers present to
    /// the user as such; every other kind indicates misuse or a defect.
    pub fn is_no_tonal_content(&self) -> bool {
        matches!(self, ConvertError::NoPitchDetected { .. })
    }
}
