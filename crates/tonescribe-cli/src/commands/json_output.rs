//! JSON output types for the `--json` flag.
//!
//! Every command prints one pretty-printed object with a `success` flag, a
//! list of errors and, on success, a command-specific result.

use serde::{Deserialize, Serialize};
use tonescribe_core::smf::{SmfNote, SmfReport, SmfTrackInfo};
use tonescribe_core::{ConvertError, Transcription};

/// Error codes for CLI-level failures. Pipeline failures carry their own
/// `CONVERT_xxx` codes.
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// Audio could not be decoded
    pub const AUDIO_DECODE: &str = "CLI_002";
    /// Config file could not be parsed
    pub const CONFIG_PARSE: &str = "CLI_003";
    /// Output could not be written
    pub const FILE_WRITE: &str = "CLI_004";
    /// MIDI file failed validation
    pub const SMF_INVALID: &str = "CLI_005";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "CONVERT_002")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl From<&ConvertError> for JsonError {
    fn from(err: &ConvertError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// JSON output for the `convert` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOutput {
    /// Whether a MIDI file was written
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// Conversion summary (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConvertReport>,
}

impl ConvertOutput {
    /// Creates a successful output.
    pub fn success(report: ConvertReport) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(report),
        }
    }

    /// Creates a failed output.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// Summary of one conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvertReport {
    /// Input audio path
    pub input: String,
    /// Written MIDI path
    pub output: String,
    /// Sample rate of the analysed audio
    pub sample_rate: u32,
    /// Samples in the analysed channel
    pub samples: usize,
    /// Frames analysed
    pub frames: usize,
    /// Frames that yielded a pitch
    pub pitched_frames: usize,
    /// Lowest pitch as a fractional MIDI note
    pub min_pitch: f64,
    /// Highest pitch as a fractional MIDI note
    pub max_pitch: f64,
    /// Quantization bins
    pub num_bins: u32,
    /// Distinct levels in first-occurrence order
    pub unique_levels: Vec<u32>,
    /// Number of notes written
    pub notes: usize,
    /// Ticks per analysis frame
    pub ticks_per_frame: u32,
    /// Size of the MIDI file in bytes
    pub bytes: usize,
    /// BLAKE3 hash of the MIDI file
    pub hash: String,
}

impl ConvertReport {
    /// Builds the report for a finished transcription.
    pub fn new(
        input: impl Into<String>,
        output: impl Into<String>,
        sample_rate: u32,
        samples: usize,
        num_bins: u32,
        transcription: &Transcription,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            sample_rate,
            samples,
            frames: transcription.frames_total,
            pitched_frames: transcription.pitches.len(),
            min_pitch: transcription.min_pitch,
            max_pitch: transcription.max_pitch,
            num_bins,
            unique_levels: transcription.unique_levels.clone(),
            notes: transcription.spans.len(),
            ticks_per_frame: transcription.ticks_per_frame,
            bytes: transcription.smf.len(),
            hash: transcription.hash.clone(),
        }
    }
}

/// JSON output for the `inspect` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectOutput {
    /// Whether the file parsed
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// Parsed structure (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<InspectReport>,
}

impl InspectOutput {
    /// Creates a successful output.
    pub fn success(report: InspectReport) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(report),
        }
    }

    /// Creates a failed output.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// Parsed structure of a MIDI file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectReport {
    /// Inspected path
    pub file: String,
    /// File size in bytes
    pub file_size: usize,
    /// BLAKE3 hash of the file
    pub hash: String,
    /// Header format field
    pub format: u16,
    /// Ticks per quarter note (absent for SMPTE timing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks_per_quarter: Option<u16>,
    /// Per-track details
    pub tracks: Vec<InspectTrack>,
    /// Non-fatal findings
    pub warnings: Vec<String>,
}

impl InspectReport {
    /// Builds the report from a validator result.
    pub fn new(file: impl Into<String>, hash: String, report: &SmfReport) -> Self {
        Self {
            file: file.into(),
            file_size: report.file_size,
            hash,
            format: report.format,
            ticks_per_quarter: report.ticks_per_quarter(),
            tracks: report.tracks.iter().map(InspectTrack::from).collect(),
            warnings: report.warnings.clone(),
        }
    }
}

/// One track of an inspected file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectTrack {
    /// Declared chunk length
    pub length: u32,
    /// Number of events
    pub events: usize,
    /// Whether the track ends with end-of-track
    pub end_of_track: bool,
    /// Track length in ticks
    pub end_tick: u64,
    /// Notes in start order
    pub notes: Vec<InspectNote>,
}

impl From<&SmfTrackInfo> for InspectTrack {
    fn from(track: &SmfTrackInfo) -> Self {
        Self {
            length: track.length,
            events: track.event_count,
            end_of_track: track.has_end_of_track,
            end_tick: track.end_tick,
            notes: track.notes.iter().map(InspectNote::from).collect(),
        }
    }
}

/// A note of an inspected track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectNote {
    /// Channel (0-15)
    pub channel: u8,
    /// Note number
    pub note: u8,
    /// Note-on velocity
    pub velocity: u8,
    /// Start in ticks
    pub start: u64,
    /// Length in ticks
    pub duration: u64,
}

impl From<&SmfNote> for InspectNote {
    fn from(note: &SmfNote) -> Self {
        Self {
            channel: note.channel,
            note: note.note,
            velocity: note.velocity,
            start: note.start_tick,
            duration: note.duration_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_omits_result() {
        let output = ConvertOutput::failure(vec![JsonError::new("CLI_001", "missing")]);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("result").is_none());
        assert_eq!(json["errors"][0]["code"], "CLI_001");
        assert!(json["errors"][0].get("file").is_none());
    }

    #[test]
    fn test_convert_error_keeps_code() {
        let err = ConvertError::NoPitchDetected { frames: 3 };
        let json = JsonError::from(&err);
        assert_eq!(json.code, "CONVERT_002");
        assert!(json.message.contains("no tonal content"));
    }
}
