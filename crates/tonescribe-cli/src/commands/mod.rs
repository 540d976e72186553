//! CLI command implementations.

pub mod convert;
pub mod inspect;
pub mod json_output;

/// Exit code for input without detectable pitch.
pub const EXIT_NO_TONAL_CONTENT: u8 = 2;
