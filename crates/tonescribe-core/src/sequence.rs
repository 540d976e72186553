//! Run-length note extraction from a level contour.

use crate::error::{ConvertError, ConvertResult};

/// MIDI note number that level 0 maps to (middle C).
pub const BASE_NOTE: u32 = 60;

/// Highest valid MIDI note number.
pub const MAX_MIDI_NOTE: u32 = 127;

/// A maximal run of identical levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSpan {
    /// Quantized level shared by every frame in the run.
    pub level: u32,
    /// Number of frames in the run (at least 1).
    pub duration_frames: u32,
}

impl NoteSpan {
    /// MIDI note number for this span's level.
    pub fn midi_note(&self) -> ConvertResult<u8> {
        level_to_note(self.level)
    }
}

/// Maps a level to its MIDI note number by adding [`BASE_NOTE`].
///
/// Levels whose note would fall outside `0..=127` are rejected rather than
/// clamped.
pub fn level_to_note(level: u32) -> ConvertResult<u8> {
    let note = level as u64 + BASE_NOTE as u64;
    if note > MAX_MIDI_NOTE as u64 {
        return Err(ConvertError::NoteRangeOverflow { level, note });
    }
    Ok(note as u8)
}

/// Note spans extracted from a level contour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteSequence {
    /// Spans in contour order.
    pub spans: Vec<NoteSpan>,
    /// Distinct levels in order of first occurrence.
    pub unique_levels: Vec<u32>,
}

impl NoteSequence {
    /// Total duration of all spans in frames.
    pub fn total_frames(&self) -> u64 {
        self.spans.iter().map(|s| s.duration_frames as u64).sum()
    }

    /// Position of a level in the unique-level table.
    pub fn unique_index(&self, level: u32) -> Option<usize> {
        self.unique_levels.iter().position(|&l| l == level)
    }
}

/// Collapses runs of equal levels into note spans.
///
/// The final run is always closed, so the span durations sum to the contour
/// length. The unique-level table is built in the same pass.
pub fn sequence_levels(levels: &[u32]) -> ConvertResult<NoteSequence> {
    let (&first, rest) = levels.split_first().ok_or_else(|| {
        ConvertError::invalid_param("levels", "cannot sequence an empty contour")
    })?;

    let mut sequence = NoteSequence::default();
    sequence.unique_levels.push(first);

    let mut current = first;
    let mut duration: u32 = 1;

    for &level in rest {
        if level == current {
            duration = duration.checked_add(1).ok_or_else(|| {
                ConvertError::encoding("note span longer than u32::MAX frames")
            })?;
            continue;
        }
        sequence.spans.push(NoteSpan {
            level: current,
            duration_frames: duration,
        });
        if !sequence.unique_levels.contains(&level) {
            sequence.unique_levels.push(level);
        }
        current = level;
        duration = 1;
    }

    sequence.spans.push(NoteSpan {
        level: current,
        duration_frames: duration,
    });

    Ok(sequence)
}
