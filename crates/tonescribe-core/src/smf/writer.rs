//! SMF writer - assembles note spans into header and track chunks.

use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

use crate::error::{ConvertError, ConvertResult};
use crate::sequence::NoteSpan;
use crate::tempo::{TempoMap, TICKS_PER_QUARTER};

use super::constants::{
    CHANNEL, CHUNK_PREAMBLE_SIZE, HEADER_BODY_LEN, HEADER_CHUNK_SIZE, MAX_DELTA_TICKS, MTHD, MTRK,
    NOTE_OFF_VELOCITY, NOTE_ON_VELOCITY, SMF_FORMAT,
};
use super::event::MidiEvent;

fn io_failure(err: std::io::Error) -> ConvertError {
    ConvertError::encoding(format!("write failed: {}", err))
}

/// One track of events, terminated by end-of-track when built from spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmfTrack {
    /// Events in playback order; deltas are relative to the previous event.
    pub events: Vec<MidiEvent>,
}

impl SmfTrack {
    /// Creates an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: MidiEvent) {
        self.events.push(event);
    }

    /// Builds the melody track for a list of note spans.
    ///
    /// Each span becomes a note-on at delta 0 followed by a note-off after the
    /// span's duration in ticks, so notes are back to back with no rests.
    pub fn from_spans(spans: &[NoteSpan], tempo: &TempoMap) -> ConvertResult<Self> {
        let mut track = Self {
            events: Vec::with_capacity(spans.len() * 2 + 1),
        };
        for span in spans {
            let note = span.midi_note()?;
            let ticks = tempo.ticks_for(span.duration_frames)?;
            track.push(MidiEvent::note_on(0, CHANNEL, note, NOTE_ON_VELOCITY));
            track.push(MidiEvent::note_off(ticks, CHANNEL, note, NOTE_OFF_VELOCITY));
        }
        track.push(MidiEvent::end_of_track(0));
        Ok(track)
    }

    /// Size of the event data (the chunk body) in bytes.
    pub fn body_len(&self) -> usize {
        self.events.iter().map(MidiEvent::encoded_len).sum()
    }

    /// Writes the complete `MTrk` chunk, returning the bytes written.
    pub fn write<W: Write>(&self, writer: &mut W) -> ConvertResult<usize> {
        let expected = self.body_len();
        let mut body = Vec::with_capacity(expected);
        for event in &self.events {
            if event.delta_ticks > MAX_DELTA_TICKS {
                return Err(ConvertError::encoding(format!(
                    "delta-time {} exceeds the SMF maximum {}",
                    event.delta_ticks, MAX_DELTA_TICKS
                )));
            }
            event.write(&mut body).map_err(io_failure)?;
        }
        if body.len() != expected {
            return Err(ConvertError::encoding(format!(
                "track body is {} bytes, computed {}",
                body.len(),
                expected
            )));
        }
        let declared = u32::try_from(body.len()).map_err(|_| {
            ConvertError::encoding(format!("track body of {} bytes exceeds u32", body.len()))
        })?;

        writer.write_all(MTRK).map_err(io_failure)?;
        writer
            .write_u32::<BigEndian>(declared)
            .map_err(io_failure)?;
        writer.write_all(&body).map_err(io_failure)?;
        Ok(CHUNK_PREAMBLE_SIZE + body.len())
    }
}

/// A Standard MIDI File: header fields plus tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmfFile {
    /// File format (0, 1 or 2).
    pub format: u16,
    /// Ticks per quarter note.
    pub division: u16,
    /// Tracks in file order.
    pub tracks: Vec<SmfTrack>,
}

impl Default for SmfFile {
    fn default() -> Self {
        Self {
            format: SMF_FORMAT,
            division: TICKS_PER_QUARTER,
            tracks: Vec::new(),
        }
    }
}

impl SmfFile {
    /// Creates a format-1 file at 480 ticks per quarter with one track.
    pub fn single_track(track: SmfTrack) -> Self {
        Self {
            tracks: vec![track],
            ..Self::default()
        }
    }

    /// Writes the header chunk and all track chunks.
    pub fn write<W: Write>(&self, writer: &mut W) -> ConvertResult<usize> {
        let num_tracks = u16::try_from(self.tracks.len()).map_err(|_| {
            ConvertError::encoding(format!("{} tracks exceed u16", self.tracks.len()))
        })?;

        writer.write_all(MTHD).map_err(io_failure)?;
        writer
            .write_u32::<BigEndian>(HEADER_BODY_LEN)
            .map_err(io_failure)?;
        writer
            .write_u16::<BigEndian>(self.format)
            .map_err(io_failure)?;
        writer
            .write_u16::<BigEndian>(num_tracks)
            .map_err(io_failure)?;
        writer
            .write_u16::<BigEndian>(self.division)
            .map_err(io_failure)?;

        let mut written = HEADER_CHUNK_SIZE;
        for track in &self.tracks {
            written += track.write(writer)?;
        }
        Ok(written)
    }

    /// Writes the file to a byte vector.
    pub fn to_bytes(&self) -> ConvertResult<Vec<u8>> {
        let expected = HEADER_CHUNK_SIZE
            + self
                .tracks
                .iter()
                .map(|t| CHUNK_PREAMBLE_SIZE + t.body_len())
                .sum::<usize>();
        let mut buffer = Vec::with_capacity(expected);
        let written = self.write(&mut buffer)?;
        if written != buffer.len() || buffer.len() != expected {
            return Err(ConvertError::encoding(format!(
                "file is {} bytes, computed {}",
                buffer.len(),
                expected
            )));
        }
        Ok(buffer)
    }

    /// Compute the BLAKE3 hash of the file bytes.
    pub fn compute_hash(&self) -> ConvertResult<String> {
        let bytes = self.to_bytes()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

/// Encodes note spans as a single-track SMF.
pub fn encode_spans(spans: &[NoteSpan], tempo: &TempoMap) -> ConvertResult<Vec<u8>> {
    let track = SmfTrack::from_spans(spans, tempo)?;
    SmfFile::single_track(track).to_bytes()
}
