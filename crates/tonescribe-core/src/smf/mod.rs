//! Standard MIDI File writer and validator.
//!
//! The writer produces a format-1 file with one track at 480 ticks per
//! quarter note. Every note span becomes a note-on (velocity `0x64`) at
//! delta 0 followed by a note-off (velocity `0x40`) after the span's tick
//! duration, all on channel 0. The track ends with the end-of-track meta
//! event and no tempo meta event is written, so players assume 120 BPM.
//!
//! # Layout
//!
//! ```text
//! 4D 54 68 64 00 00 00 06 00 01 00 01 01 E0   MThd, len 6, format 1, 1 track, 480
//! 4D 54 72 6B <u32 big-endian length>          MTrk
//! <delta> 90 nn 64  <delta> 80 nn 40 ...       note pairs
//! 00 FF 2F 00                                  end of track
//! ```
//!
//! # Validation
//!
//! ```rust,ignore
//! use tonescribe_core::smf::SmfValidator;
//!
//! let report = SmfValidator::validate(&bytes)?;
//! for note in report.notes() {
//!     println!("{} at {} for {}", note.note, note.start_tick, note.duration_ticks);
//! }
//! ```

pub mod constants;
mod event;
mod validator;
mod vlq;
mod writer;

pub use event::*;
pub use validator::*;
pub use vlq::*;
pub use writer::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::sequence::NoteSpan;
    use crate::tempo::TempoMap;
    use pretty_assertions::assert_eq;

    fn span(level: u32, duration_frames: u32) -> NoteSpan {
        NoteSpan {
            level,
            duration_frames,
        }
    }

    fn per_frame() -> TempoMap {
        TempoMap { ticks_per_frame: 1 }
    }

    // ========================================================================
    // Writer Tests
    // ========================================================================

    #[test]
    fn test_single_span_layout() {
        let bytes = encode_spans(&[span(0, 42)], &per_frame()).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x01, 0x00, 0x01, 0x01,
                0xE0, // header
                0x4D, 0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x0C, // MTrk, 12 bytes
                0x00, 0x90, 0x3C, 0x64, // note on
                0x2A, 0x80, 0x3C, 0x40, // note off after 42 ticks
                0x00, 0xFF, 0x2F, 0x00, // end of track
            ]
        );
    }

    #[test]
    fn test_multi_span_events() {
        let spans = [span(0, 3), span(1, 2), span(0, 1)];
        let bytes = encode_spans(&spans, &per_frame()).unwrap();
        assert_eq!(
            &bytes[22..],
            &[
                0x00, 0x90, 60, 0x64, 0x03, 0x80, 60, 0x40, //
                0x00, 0x90, 61, 0x64, 0x02, 0x80, 61, 0x40, //
                0x00, 0x90, 60, 0x64, 0x01, 0x80, 60, 0x40, //
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
        assert_eq!(&bytes[18..22], &[0, 0, 0, 28]);
    }

    #[test]
    fn test_scaled_durations_use_multibyte_deltas() {
        let tempo = TempoMap {
            ticks_per_frame: 22,
        };
        let bytes = encode_spans(&[span(0, 42)], &tempo).unwrap();
        // 42 * 22 = 924 ticks
        assert_eq!(&bytes[26..31], &[0x87, 0x1C, 0x80, 0x3C, 0x40]);
        assert_eq!(&bytes[18..22], &[0, 0, 0, 13]);
    }

    #[test]
    fn test_track_length_matches_body() {
        let spans: Vec<NoteSpan> = (0..20).map(|i| span(i % 5, 1 + i * 300)).collect();
        let bytes = encode_spans(&spans, &per_frame()).unwrap();
        let declared = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]);
        assert_eq!(declared as usize, bytes.len() - 22);
    }

    #[test]
    fn test_level_past_note_range_rejected() {
        let err = encode_spans(&[span(0, 1), span(68, 1)], &per_frame()).unwrap_err();
        assert_eq!(
            err,
            ConvertError::NoteRangeOverflow {
                level: 68,
                note: 128
            }
        );
    }

    #[test]
    fn test_highest_note_accepted() {
        let bytes = encode_spans(&[span(67, 1)], &per_frame()).unwrap();
        assert_eq!(bytes[24], 127);
    }

    #[test]
    fn test_delta_past_four_byte_limit_rejected() {
        let tempo = TempoMap {
            ticks_per_frame: 0x0800_0000,
        };
        let err = encode_spans(&[span(0, 2)], &tempo).unwrap_err();
        assert!(matches!(err, ConvertError::EncodingInvariantViolation { .. }));
    }

    #[test]
    fn test_tick_overflow_rejected() {
        let tempo = TempoMap {
            ticks_per_frame: u32::MAX,
        };
        let err = encode_spans(&[span(0, 2)], &tempo).unwrap_err();
        assert_eq!(err.code(), "CONVERT_005");
    }

    #[test]
    fn test_hash_is_stable() {
        let file = SmfFile::single_track(
            SmfTrack::from_spans(&[span(2, 5), span(0, 7)], &per_frame()).unwrap(),
        );
        let first = file.compute_hash().unwrap();
        assert_eq!(first, file.compute_hash().unwrap());
        assert_eq!(first.len(), 64);
    }

    // ========================================================================
    // Validator Tests
    // ========================================================================

    #[test]
    fn validator_rejects_too_small_files() {
        let err = SmfValidator::validate(&[]).unwrap_err();
        match err {
            SmfFormatError::FileTooSmall { .. } => {}
            other => panic!("expected FileTooSmall, got {:?}", other),
        }
    }

    #[test]
    fn validator_accepts_writer_output() {
        let spans = [span(0, 3), span(4, 2), span(0, 5)];
        let bytes = encode_spans(&spans, &per_frame()).unwrap();
        let report = SmfValidator::validate(&bytes).unwrap();

        assert_eq!(report.format, 1);
        assert_eq!(report.num_tracks, 1);
        assert_eq!(report.ticks_per_quarter(), Some(480));
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);

        let track = &report.tracks[0];
        assert!(track.has_end_of_track);
        assert_eq!(track.unterminated_notes, 0);
        assert_eq!(track.end_tick, 10);
        let notes: Vec<(u8, u64, u64)> = track
            .notes
            .iter()
            .map(|n| (n.note, n.start_tick, n.duration_ticks))
            .collect();
        assert_eq!(notes, vec![(60, 0, 3), (64, 3, 2), (60, 5, 5)]);
    }

    #[test]
    fn validator_rejects_bad_tag() {
        let mut bytes = encode_spans(&[span(0, 1)], &per_frame()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            SmfValidator::validate(&bytes),
            Err(SmfFormatError::InvalidHeaderTag { .. })
        ));
    }

    #[test]
    fn validator_rejects_truncated_track() {
        let bytes = encode_spans(&[span(0, 1)], &per_frame()).unwrap();
        let err = SmfValidator::validate(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, SmfFormatError::TruncatedChunk { offset: 14, .. }));
    }

    #[test]
    fn validator_rejects_track_count_mismatch() {
        let mut bytes = encode_spans(&[span(0, 1)], &per_frame()).unwrap();
        bytes[11] = 2;
        assert_eq!(
            SmfValidator::validate(&bytes).unwrap_err(),
            SmfFormatError::TrackCountMismatch {
                declared: 2,
                found: 1
            }
        );
    }

    #[test]
    fn validator_handles_running_status_and_zero_velocity_off() {
        let mut file = Vec::new();
        file.extend_from_slice(b"MThd");
        file.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
        let body = [
            0x00, 0x90, 62, 80, // note on
            0x10, 62, 0, // running status, velocity 0 = off
            0x00, 0xC0, 5, // program change, one data byte
            0x00, 0xFF, 0x2F, 0x00,
        ];
        file.extend_from_slice(b"MTrk");
        file.extend_from_slice(&(body.len() as u32).to_be_bytes());
        file.extend_from_slice(&body);

        let report = SmfValidator::validate(&file).unwrap();
        let track = &report.tracks[0];
        assert_eq!(track.event_count, 4);
        assert_eq!(track.note_on_count, 1);
        assert_eq!(track.note_off_count, 1);
        assert_eq!(
            track.notes,
            vec![SmfNote {
                channel: 0,
                note: 62,
                velocity: 80,
                start_tick: 0,
                duration_ticks: 16
            }]
        );
    }

    #[test]
    fn validator_skips_unknown_chunks() {
        let mut bytes = encode_spans(&[span(0, 1)], &per_frame()).unwrap();
        bytes.extend_from_slice(b"XFIH");
        bytes.extend_from_slice(&[0, 0, 0, 2, 0xAA, 0xBB]);
        let report = SmfValidator::validate(&bytes).unwrap();
        assert_eq!(report.tracks.len(), 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn validator_rejects_events_after_end_of_track() {
        let mut bytes = encode_spans(&[span(0, 1)], &per_frame()).unwrap();
        bytes.extend_from_slice(&[0x00, 0x90, 60, 0x64]);
        let len = (bytes.len() - 22) as u32;
        bytes[18..22].copy_from_slice(&len.to_be_bytes());
        assert!(matches!(
            SmfValidator::validate(&bytes),
            Err(SmfFormatError::EventsAfterEndOfTrack { .. })
        ));
    }

    #[test]
    fn validator_rejects_five_byte_delta() {
        let mut file = Vec::new();
        file.extend_from_slice(b"MThd");
        file.extend_from_slice(&[0, 0, 0, 6, 0, 1, 0, 1, 1, 0xE0]);
        let body = [0x81, 0x80, 0x80, 0x80, 0x00, 0xFF, 0x2F, 0x00];
        file.extend_from_slice(b"MTrk");
        file.extend_from_slice(&(body.len() as u32).to_be_bytes());
        file.extend_from_slice(&body);
        assert_eq!(
            SmfValidator::validate(&file).unwrap_err(),
            SmfFormatError::InvalidVlq { offset: 22 }
        );
    }

    #[test]
    fn validator_reports_unterminated_notes() {
        let mut track = SmfTrack::new();
        track.push(MidiEvent::note_on(0, 0, 60, 100));
        track.push(MidiEvent::end_of_track(10));
        let bytes = SmfFile::single_track(track).to_bytes().unwrap();
        let report = SmfValidator::validate(&bytes).unwrap();
        assert_eq!(report.tracks[0].unterminated_notes, 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn is_smf_checks_tag() {
        let bytes = encode_spans(&[span(0, 1)], &per_frame()).unwrap();
        assert!(SmfValidator::is_smf(&bytes));
        assert!(!SmfValidator::is_smf(b"RIFF\0\0\0\0WAVEfmt "));
    }
}
