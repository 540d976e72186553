//! Track events emitted by the encoder.

use byteorder::WriteBytesExt;
use std::io::{self, Write};

use super::constants::{META_END_OF_TRACK, META_EVENT, STATUS_NOTE_OFF, STATUS_NOTE_ON};
use super::vlq::{vlq_len, write_vlq};

/// Payload of a track event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Note-on channel voice message.
    NoteOn {
        /// Channel (0-15).
        channel: u8,
        /// Note number (0-127).
        note: u8,
        /// Velocity (0-127).
        velocity: u8,
    },
    /// Note-off channel voice message.
    NoteOff {
        /// Channel (0-15).
        channel: u8,
        /// Note number (0-127).
        note: u8,
        /// Release velocity (0-127).
        velocity: u8,
    },
    /// End-of-track meta event.
    EndOfTrack,
}

/// A track event with its delta-time relative to the preceding event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    /// Ticks since the previous event in the track.
    pub delta_ticks: u32,
    /// Event payload.
    pub kind: EventKind,
}

impl MidiEvent {
    /// Creates a note-on event.
    pub fn note_on(delta_ticks: u32, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            delta_ticks,
            kind: EventKind::NoteOn {
                channel,
                note,
                velocity,
            },
        }
    }

    /// Creates a note-off event.
    pub fn note_off(delta_ticks: u32, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            delta_ticks,
            kind: EventKind::NoteOff {
                channel,
                note,
                velocity,
            },
        }
    }

    /// Creates an end-of-track event.
    pub fn end_of_track(delta_ticks: u32) -> Self {
        Self {
            delta_ticks,
            kind: EventKind::EndOfTrack,
        }
    }

    /// Number of bytes after the delta-time. Status plus two data bytes for
    /// voice messages; `FF 2F 00` for end-of-track.
    fn body_len(&self) -> usize {
        3
    }

    /// Number of bytes [`write`](Self::write) produces.
    pub fn encoded_len(&self) -> usize {
        vlq_len(self.delta_ticks) + self.body_len()
    }

    /// Writes the delta-time and event bytes, returning the byte count.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let delta_len = write_vlq(writer, self.delta_ticks)?;
        match self.kind {
            EventKind::NoteOn {
                channel,
                note,
                velocity,
            } => {
                writer.write_u8(STATUS_NOTE_ON | (channel & 0x0F))?;
                writer.write_u8(note & 0x7F)?;
                writer.write_u8(velocity & 0x7F)?;
            }
            EventKind::NoteOff {
                channel,
                note,
                velocity,
            } => {
                writer.write_u8(STATUS_NOTE_OFF | (channel & 0x0F))?;
                writer.write_u8(note & 0x7F)?;
                writer.write_u8(velocity & 0x7F)?;
            }
            EventKind::EndOfTrack => {
                writer.write_u8(META_EVENT)?;
                writer.write_u8(META_END_OF_TRACK)?;
                writer.write_u8(0x00)?;
            }
        }
        Ok(delta_len + self.body_len())
    }
}
