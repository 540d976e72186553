//! Standard MIDI File constants.

/// Header chunk tag.
pub const MTHD: &[u8; 4] = b"MThd";

/// Track chunk tag.
pub const MTRK: &[u8; 4] = b"MTrk";

/// Length of the header chunk body.
pub const HEADER_BODY_LEN: u32 = 6;

/// Total size of the header chunk (tag + length + body).
pub const HEADER_CHUNK_SIZE: usize = 14;

/// Size of a chunk preamble (tag + length).
pub const CHUNK_PREAMBLE_SIZE: usize = 8;

/// File format written by the encoder (simultaneous tracks).
pub const SMF_FORMAT: u16 = 1;

/// Highest defined file format.
pub const SMF_MAX_FORMAT: u16 = 2;

/// Channel used for every event.
pub const CHANNEL: u8 = 0;

/// Note-on velocity.
pub const NOTE_ON_VELOCITY: u8 = 0x64;

/// Note-off (release) velocity.
pub const NOTE_OFF_VELOCITY: u8 = 0x40;

/// Note-off status nibble.
pub const STATUS_NOTE_OFF: u8 = 0x80;

/// Note-on status nibble.
pub const STATUS_NOTE_ON: u8 = 0x90;

/// Meta event status byte.
pub const META_EVENT: u8 = 0xFF;

/// End-of-track meta event type.
pub const META_END_OF_TRACK: u8 = 0x2F;

/// SysEx start status byte.
pub const SYSEX_START: u8 = 0xF0;

/// SysEx continuation / escape status byte.
pub const SYSEX_ESCAPE: u8 = 0xF7;

/// Largest delta-time representable in a four-byte VLQ.
pub const MAX_DELTA_TICKS: u32 = 0x0FFF_FFFF;

/// Maximum VLQ length allowed inside a file.
pub const MAX_SMF_VLQ_BYTES: usize = 4;

/// Bit set on every VLQ byte except the last.
pub const VLQ_CONTINUATION: u8 = 0x80;
