//! MIDI variable-length quantities.
//!
//! Seven data bits per byte, most significant group first, with the high bit
//! set on every byte except the last. The encoding is always minimal, so `0`
//! is a single zero byte. Any `u32` fits in at most five bytes; files limit
//! delta-times to four (see [`MAX_DELTA_TICKS`](super::constants::MAX_DELTA_TICKS)).

use std::io::{self, Write};

use super::constants::VLQ_CONTINUATION;

/// Longest encoding of a `u32`.
pub const MAX_VLQ_BYTES: usize = 5;

/// Number of bytes the minimal encoding of `value` occupies.
pub fn vlq_len(value: u32) -> usize {
    let mut len = 1;
    let mut rest = value >> 7;
    while rest != 0 {
        len += 1;
        rest >>= 7;
    }
    len
}

/// Encodes `value` into a fixed buffer, returning the buffer and the number
/// of bytes used.
fn encode_into(value: u32) -> ([u8; MAX_VLQ_BYTES], usize) {
    let mut buf = [0u8; MAX_VLQ_BYTES];
    let len = vlq_len(value);
    for (i, byte) in buf[..len].iter_mut().enumerate() {
        let shift = 7 * (len - 1 - i);
        let group = ((value >> shift) & 0x7F) as u8;
        *byte = if i + 1 < len {
            group | VLQ_CONTINUATION
        } else {
            group
        };
    }
    (buf, len)
}

/// Encodes `value` as a minimal VLQ.
pub fn encode_vlq(value: u32) -> Vec<u8> {
    let (buf, len) = encode_into(value);
    buf[..len].to_vec()
}

/// Writes `value` as a minimal VLQ, returning the number of bytes written.
pub fn write_vlq<W: Write>(writer: &mut W, value: u32) -> io::Result<usize> {
    let (buf, len) = encode_into(value);
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Decodes a VLQ from the start of `data`.
///
/// Returns the value and the number of bytes consumed, or `None` when the
/// data ends mid-quantity or the value does not fit in a `u32`.
pub fn decode_vlq(data: &[u8]) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().take(MAX_VLQ_BYTES).enumerate() {
        if value > (u32::MAX >> 7) {
            return None;
        }
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & VLQ_CONTINUATION == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
