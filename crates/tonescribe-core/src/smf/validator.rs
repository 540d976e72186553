//! Standard MIDI File parser and structural validator.
//!
//! Checks the header chunk, walks every chunk, decodes the events of each
//! `MTrk` chunk (channel voice messages with running status, meta and SysEx
//! events) and pairs note-on/note-off events into notes with absolute tick
//! positions. Unknown chunk types are skipped, as the format requires.
//!
//! The validator never panics on arbitrary input.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use super::constants::{
    CHUNK_PREAMBLE_SIZE, HEADER_BODY_LEN, HEADER_CHUNK_SIZE, MAX_SMF_VLQ_BYTES,
    META_END_OF_TRACK, META_EVENT, MTHD, MTRK, SMF_MAX_FORMAT, STATUS_NOTE_OFF, STATUS_NOTE_ON,
    SYSEX_ESCAPE, SYSEX_START,
};
use super::vlq::decode_vlq;

/// SMF validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmfFormatError {
    /// File is smaller than a header chunk.
    #[error("file too small: {size} bytes, need at least {minimum}")]
    FileTooSmall { size: usize, minimum: usize },
    /// File does not start with `MThd`.
    #[error("missing MThd tag, found {found:?}")]
    InvalidHeaderTag { found: Vec<u8> },
    /// Header body is shorter than six bytes.
    #[error("header length {length} is shorter than 6")]
    InvalidHeaderLength { length: u32 },
    /// Format field is not 0, 1 or 2.
    #[error("unsupported SMF format {format}")]
    UnsupportedFormat { format: u16 },
    /// Format 0 file declares more than one track.
    #[error("format 0 requires exactly one track, header declares {tracks}")]
    InvalidTrackCountForFormat { tracks: u16 },
    /// Division field is zero.
    #[error("division is zero")]
    ZeroDivision,
    /// A chunk's declared length runs past the end of the file.
    #[error("chunk at offset {offset} declares {declared} bytes but only {available} remain")]
    TruncatedChunk {
        offset: usize,
        declared: u32,
        available: usize,
    },
    /// Trailing bytes too short to hold a chunk preamble.
    #[error("{remaining} trailing bytes at offset {offset} do not form a chunk")]
    TrailingBytes { offset: usize, remaining: usize },
    /// Number of `MTrk` chunks differs from the header.
    #[error("header declares {declared} tracks, file contains {found}")]
    TrackCountMismatch { declared: u16, found: u16 },
    /// A delta-time or length VLQ is malformed.
    #[error("malformed variable-length quantity at offset {offset}")]
    InvalidVlq { offset: usize },
    /// Data byte without a preceding status byte.
    #[error("data byte 0x{byte:02X} at offset {offset} without running status")]
    MissingRunningStatus { offset: usize, byte: u8 },
    /// An event runs past the end of its track.
    #[error("event at offset {offset} runs past the end of its track")]
    TruncatedEvent { offset: usize },
    /// A system common / real-time status byte inside a track.
    #[error("unsupported status byte 0x{status:02X} at offset {offset}")]
    UnsupportedStatus { offset: usize, status: u8 },
    /// Events follow the end-of-track meta event.
    #[error("events follow end-of-track at offset {offset}")]
    EventsAfterEndOfTrack { offset: usize },
}

/// A decoded note with absolute timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmfNote {
    /// Channel (0-15).
    pub channel: u8,
    /// Note number (0-127).
    pub note: u8,
    /// Note-on velocity.
    pub velocity: u8,
    /// Absolute start in ticks.
    pub start_tick: u64,
    /// Length in ticks.
    pub duration_ticks: u64,
}

/// Information about one `MTrk` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmfTrackInfo {
    /// Offset of the chunk tag in the file.
    pub offset: usize,
    /// Declared body length.
    pub length: u32,
    /// Total number of events.
    pub event_count: usize,
    /// Number of note-on events with non-zero velocity.
    pub note_on_count: usize,
    /// Number of note-off events (including note-on with velocity 0).
    pub note_off_count: usize,
    /// Number of meta events.
    pub meta_count: usize,
    /// Notes paired in start order.
    pub notes: Vec<SmfNote>,
    /// Note-ons never released.
    pub unterminated_notes: usize,
    /// Whether the last event is end-of-track.
    pub has_end_of_track: bool,
    /// Absolute tick of the last event.
    pub end_tick: u64,
}

/// Result of validating an SMF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmfReport {
    /// File size in bytes.
    pub file_size: usize,
    /// Header format field.
    pub format: u16,
    /// Header track count.
    pub num_tracks: u16,
    /// Raw division field.
    pub division: u16,
    /// Tracks in file order.
    pub tracks: Vec<SmfTrackInfo>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl SmfReport {
    /// Ticks per quarter note, or `None` for SMPTE timing.
    pub fn ticks_per_quarter(&self) -> Option<u16> {
        if self.division & 0x8000 == 0 {
            Some(self.division)
        } else {
            None
        }
    }

    /// All notes across tracks.
    pub fn notes(&self) -> impl Iterator<Item = &SmfNote> {
        self.tracks.iter().flat_map(|t| t.notes.iter())
    }
}

/// SMF validator.
pub struct SmfValidator;

impl SmfValidator {
    /// Validate an SMF from raw bytes.
    pub fn validate(data: &[u8]) -> Result<SmfReport, SmfFormatError> {
        let (format, num_tracks, division, mut offset) = parse_header(data)?;
        let mut report = SmfReport {
            file_size: data.len(),
            format,
            num_tracks,
            division,
            tracks: Vec::new(),
            warnings: Vec::new(),
        };

        while offset < data.len() {
            let remaining = data.len() - offset;
            if remaining < CHUNK_PREAMBLE_SIZE {
                return Err(SmfFormatError::TrailingBytes { offset, remaining });
            }
            let tag = &data[offset..offset + 4];
            let declared = read_u32_be(&data[offset + 4..offset + 8]);
            let body_start = offset + CHUNK_PREAMBLE_SIZE;
            let available = data.len() - body_start;
            if declared as usize > available {
                return Err(SmfFormatError::TruncatedChunk {
                    offset,
                    declared,
                    available,
                });
            }
            let body_end = body_start + declared as usize;

            if tag == MTRK {
                let mut info = parse_track(&data[body_start..body_end], body_start)?;
                info.offset = offset;
                info.length = declared;
                if !info.has_end_of_track {
                    report
                        .warnings
                        .push(format!("track at offset {} has no end-of-track", offset));
                }
                if info.unterminated_notes > 0 {
                    report.warnings.push(format!(
                        "track at offset {} leaves {} notes sounding",
                        offset, info.unterminated_notes
                    ));
                }
                report.tracks.push(info);
            } else {
                report.warnings.push(format!(
                    "skipped unknown chunk {:?} at offset {}",
                    String::from_utf8_lossy(tag),
                    offset
                ));
            }
            offset = body_end;
        }

        let found = u16::try_from(report.tracks.len()).unwrap_or(u16::MAX);
        if found != num_tracks {
            return Err(SmfFormatError::TrackCountMismatch {
                declared: num_tracks,
                found,
            });
        }

        Ok(report)
    }

    /// Check if data starts with an SMF header tag.
    pub fn is_smf(data: &[u8]) -> bool {
        data.len() >= HEADER_CHUNK_SIZE && &data[0..4] == MTHD
    }
}

fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_u16_be(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Parses the header chunk, returning format, track count, division and the
/// offset of the first chunk after it.
fn parse_header(data: &[u8]) -> Result<(u16, u16, u16, usize), SmfFormatError> {
    if data.len() < HEADER_CHUNK_SIZE {
        return Err(SmfFormatError::FileTooSmall {
            size: data.len(),
            minimum: HEADER_CHUNK_SIZE,
        });
    }
    if &data[0..4] != MTHD {
        return Err(SmfFormatError::InvalidHeaderTag {
            found: data[0..4].to_vec(),
        });
    }
    let length = read_u32_be(&data[4..8]);
    if length < HEADER_BODY_LEN {
        return Err(SmfFormatError::InvalidHeaderLength { length });
    }
    let available = data.len() - CHUNK_PREAMBLE_SIZE;
    if length as usize > available {
        return Err(SmfFormatError::TruncatedChunk {
            offset: 0,
            declared: length,
            available,
        });
    }

    let format = read_u16_be(&data[8..10]);
    let num_tracks = read_u16_be(&data[10..12]);
    let division = read_u16_be(&data[12..14]);

    if format > SMF_MAX_FORMAT {
        return Err(SmfFormatError::UnsupportedFormat { format });
    }
    if format == 0 && num_tracks != 1 {
        return Err(SmfFormatError::InvalidTrackCountForFormat { tracks: num_tracks });
    }
    if division == 0 {
        return Err(SmfFormatError::ZeroDivision);
    }

    Ok((
        format,
        num_tracks,
        division,
        CHUNK_PREAMBLE_SIZE + length as usize,
    ))
}

/// Reads a VLQ limited to the in-file maximum length.
fn read_delta(body: &[u8], pos: usize, base: usize) -> Result<(u32, usize), SmfFormatError> {
    let limit = (pos + MAX_SMF_VLQ_BYTES).min(body.len());
    decode_vlq(&body[pos..limit]).ok_or(SmfFormatError::InvalidVlq { offset: base + pos })
}

/// Number of data bytes following a channel voice status.
fn channel_data_len(status: u8) -> usize {
    match status & 0xF0 {
        0xC0 | 0xD0 => 1,
        _ => 2,
    }
}

/// Walks one track body. `base` is the file offset of the body, for errors.
fn parse_track(body: &[u8], base: usize) -> Result<SmfTrackInfo, SmfFormatError> {
    let mut info = SmfTrackInfo::default();
    let mut pos = 0;
    let mut tick: u64 = 0;
    let mut running_status: Option<u8> = None;
    let mut sounding: HashMap<(u8, u8), VecDeque<(u64, u8)>> = HashMap::new();

    while pos < body.len() {
        if info.has_end_of_track {
            return Err(SmfFormatError::EventsAfterEndOfTrack { offset: base + pos });
        }
        let event_offset = base + pos;
        let (delta, used) = read_delta(body, pos, base)?;
        pos += used;
        tick += delta as u64;

        let first = *body
            .get(pos)
            .ok_or(SmfFormatError::TruncatedEvent { offset: event_offset })?;

        match first {
            META_EVENT => {
                let meta_type = *body
                    .get(pos + 1)
                    .ok_or(SmfFormatError::TruncatedEvent { offset: event_offset })?;
                pos += 2;
                let (len, used) = read_delta(body, pos, base)?;
                pos += used;
                if body.len() - pos < len as usize {
                    return Err(SmfFormatError::TruncatedEvent { offset: event_offset });
                }
                pos += len as usize;
                info.meta_count += 1;
                if meta_type == META_END_OF_TRACK {
                    info.has_end_of_track = true;
                }
                running_status = None;
            }
            SYSEX_START | SYSEX_ESCAPE => {
                pos += 1;
                let (len, used) = read_delta(body, pos, base)?;
                pos += used;
                if body.len() - pos < len as usize {
                    return Err(SmfFormatError::TruncatedEvent { offset: event_offset });
                }
                pos += len as usize;
                running_status = None;
            }
            0xF1..=0xFE => {
                return Err(SmfFormatError::UnsupportedStatus {
                    offset: base + pos,
                    status: first,
                });
            }
            _ => {
                let status = if first & 0x80 != 0 {
                    pos += 1;
                    running_status = Some(first);
                    first
                } else {
                    running_status.ok_or(SmfFormatError::MissingRunningStatus {
                        offset: base + pos,
                        byte: first,
                    })?
                };
                let data_len = channel_data_len(status);
                if body.len() - pos < data_len {
                    return Err(SmfFormatError::TruncatedEvent { offset: event_offset });
                }
                let data = &body[pos..pos + data_len];
                pos += data_len;

                let channel = status & 0x0F;
                match status & 0xF0 {
                    STATUS_NOTE_ON if data[1] > 0 => {
                        info.note_on_count += 1;
                        sounding
                            .entry((channel, data[0]))
                            .or_default()
                            .push_back((tick, data[1]));
                    }
                    STATUS_NOTE_ON | STATUS_NOTE_OFF => {
                        info.note_off_count += 1;
                        if let Some((start, velocity)) = sounding
                            .get_mut(&(channel, data[0]))
                            .and_then(VecDeque::pop_front)
                        {
                            info.notes.push(SmfNote {
                                channel,
                                note: data[0],
                                velocity,
                                start_tick: start,
                                duration_ticks: tick - start,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        info.event_count += 1;
        info.end_tick = tick;
    }

    info.unterminated_notes = sounding.values().map(VecDeque::len).sum();
    info.notes.sort_by_key(|n| (n.start_tick, n.channel, n.note));
    Ok(info)
}
