//! Output file naming.

use std::path::{Path, PathBuf};

/// Extension of written MIDI files.
pub const MIDI_EXTENSION: &str = "mid";

/// Default output path for an input: the same directory and base name with
/// the extension replaced by `.mid` (or appended when there is none).
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(MIDI_EXTENSION)
}

/// Resolves the output path, preferring an explicit one.
pub fn resolve_output_path(input: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input),
    }
}
