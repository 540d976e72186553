//! The audio-to-SMF pipeline.
//!
//! [`convert`] wires the stages together: frames are cut from the sample
//! buffer, each frame yields an optional pitch, the accepted pitches are
//! quantized against their global range, runs of equal levels become note
//! spans, and the spans are scaled to ticks and encoded as a one-track SMF.

use std::ops::ControlFlow;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::frame::{FrameSource, DEFAULT_FRAME_SIZE, DEFAULT_HOP};
use crate::pitch::estimate_pitch;
use crate::progress::{Progress, ProgressGate};
use crate::quantize::quantize;
use crate::sequence::{sequence_levels, NoteSpan};
use crate::smf::{SmfFile, SmfTrack};
use crate::tempo::{TempoMap, TempoPolicy};

fn default_frame_size() -> u32 {
    DEFAULT_FRAME_SIZE
}

fn default_hop() -> u32 {
    DEFAULT_HOP
}

/// Parameters of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertParams {
    /// Number of quantization bins; levels span `0..=num_bins`.
    pub num_bins: u32,
    /// Analysis window length in samples.
    #[serde(default = "default_frame_size")]
    pub frame_size: u32,
    /// Distance between window starts in samples.
    #[serde(default = "default_hop")]
    pub hop: u32,
    /// How frame counts map to ticks.
    #[serde(default)]
    pub tempo: TempoPolicy,
}

impl ConvertParams {
    /// Parameters with the default window sizes and one tick per frame.
    pub fn new(num_bins: u32) -> Self {
        Self {
            num_bins,
            frame_size: DEFAULT_FRAME_SIZE,
            hop: DEFAULT_HOP,
            tempo: TempoPolicy::default(),
        }
    }

    /// Sets the window sizes.
    pub fn with_window(mut self, frame_size: u32, hop: u32) -> Self {
        self.frame_size = frame_size;
        self.hop = hop;
        self
    }

    /// Sets the tempo policy.
    pub fn with_tempo(mut self, tempo: TempoPolicy) -> Self {
        self.tempo = tempo;
        self
    }

    /// Checks every parameter that does not depend on the input.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.num_bins == 0 {
            return Err(ConvertError::invalid_param(
                "num_bins",
                "must be greater than 0",
            ));
        }
        if self.frame_size == 0 {
            return Err(ConvertError::invalid_param(
                "frame_size",
                "must be greater than 0",
            ));
        }
        if self.hop == 0 {
            return Err(ConvertError::invalid_param("hop", "must be greater than 0"));
        }
        if self.hop > self.frame_size {
            return Err(ConvertError::invalid_param(
                "hop",
                format!("{} exceeds frame_size {}", self.hop, self.frame_size),
            ));
        }
        Ok(())
    }
}

/// Everything a conversion produced, intermediate stages included.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    /// Frames analysed.
    pub frames_total: usize,
    /// Pitch contour: one fractional MIDI note per accepted frame.
    pub pitches: Vec<f64>,
    /// Level contour, index-aligned with `pitches`.
    pub levels: Vec<u32>,
    /// Lowest accepted pitch.
    pub min_pitch: f64,
    /// Highest accepted pitch.
    pub max_pitch: f64,
    /// Note spans in order.
    pub spans: Vec<NoteSpan>,
    /// Distinct levels in order of first occurrence.
    pub unique_levels: Vec<u32>,
    /// Resolved tick scale.
    pub ticks_per_frame: u32,
    /// Encoded Standard MIDI File.
    pub smf: Vec<u8>,
    /// BLAKE3 hash of `smf`, hex encoded.
    pub hash: String,
}

impl Transcription {
    /// Consumes the transcription, returning the SMF bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.smf
    }
}

/// Converts mono samples to SMF bytes.
///
/// # Errors
///
/// Parameters are checked first (`num_bins`, `frame_size`, `hop`,
/// `sample_rate`, tempo speed), then input length ([`ConvertError::EmptyInput`]
/// when no complete frame fits), then content ([`ConvertError::NoPitchDetected`]
/// when no frame yields a pitch in band).
pub fn convert(samples: &[f32], sample_rate: u32, params: &ConvertParams) -> ConvertResult<Vec<u8>> {
    transcribe(samples, sample_rate, params).map(Transcription::into_bytes)
}

/// Like [`convert`], reporting progress through `on_progress`.
pub fn convert_with_progress<F>(
    samples: &[f32],
    sample_rate: u32,
    params: &ConvertParams,
    on_progress: F,
) -> ConvertResult<Vec<u8>>
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    transcribe_with_progress(samples, sample_rate, params, on_progress)
        .map(Transcription::into_bytes)
}

/// Runs the pipeline and keeps every intermediate stage.
pub fn transcribe(
    samples: &[f32],
    sample_rate: u32,
    params: &ConvertParams,
) -> ConvertResult<Transcription> {
    transcribe_with_progress(samples, sample_rate, params, |_| ControlFlow::Continue(()))
}

/// Runs the pipeline, reporting scan progress.
///
/// `on_progress` is called at most once per whole percent of frames scanned
/// and once the scan completes. Returning [`ControlFlow::Break`] stops the
/// scan before the next frame and the call fails with
/// [`ConvertError::Interrupted`]. A break on the completion report has no
/// frame left to skip and is ignored.
pub fn transcribe_with_progress<F>(
    samples: &[f32],
    sample_rate: u32,
    params: &ConvertParams,
    on_progress: F,
) -> ConvertResult<Transcription>
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    params.validate()?;
    if sample_rate == 0 {
        return Err(ConvertError::invalid_param(
            "sample_rate",
            "must be greater than 0",
        ));
    }
    params.tempo.validate()?;

    let source = FrameSource::new(samples, params.frame_size, params.hop)?;
    let frames_total = source.frame_count();
    if frames_total == 0 {
        return Err(ConvertError::EmptyInput {
            samples: samples.len(),
            frame_size: params.frame_size,
        });
    }
    debug!(
        "analysing {} frames ({} samples at {} Hz, frame {} hop {})",
        frames_total,
        samples.len(),
        sample_rate,
        params.frame_size,
        params.hop
    );

    let pitches = scan_pitches(&source, sample_rate, on_progress)?;
    if pitches.is_empty() {
        return Err(ConvertError::NoPitchDetected {
            frames: frames_total,
        });
    }
    debug!("{} of {} frames yielded a pitch", pitches.len(), frames_total);

    let quantization = quantize(&pitches, params.num_bins)?;
    debug!(
        "pitch range {:.3}..{:.3}, step {:.4}",
        quantization.min, quantization.max, quantization.step
    );

    let sequence = sequence_levels(&quantization.levels)?;
    debug!(
        "{} note spans over {} distinct levels",
        sequence.spans.len(),
        sequence.unique_levels.len()
    );

    let tempo = TempoMap::resolve(&params.tempo, samples.len(), sample_rate, params.hop)?;
    debug!("{} ticks per frame", tempo.ticks_per_frame);

    let file = SmfFile::single_track(SmfTrack::from_spans(&sequence.spans, &tempo)?);
    let smf = file.to_bytes()?;
    let hash = blake3::hash(&smf).to_hex().to_string();
    debug!("encoded {} bytes, hash {}", smf.len(), hash);

    Ok(Transcription {
        frames_total,
        pitches,
        levels: quantization.levels,
        min_pitch: quantization.min,
        max_pitch: quantization.max,
        spans: sequence.spans,
        unique_levels: sequence.unique_levels,
        ticks_per_frame: tempo.ticks_per_frame,
        smf,
        hash,
    })
}

/// Estimates the pitch of every frame, keeping the accepted ones in order.
fn scan_pitches<F>(
    source: &FrameSource<'_>,
    sample_rate: u32,
    on_progress: F,
) -> ConvertResult<Vec<f64>>
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    let frames_total = source.frame_count();
    let mut gate = ProgressGate::new(frames_total, on_progress);
    let mut pitches = Vec::with_capacity(frames_total);

    for (index, frame) in source.frames().enumerate() {
        match estimate_pitch(frame, sample_rate) {
            Some(pitch) => pitches.push(pitch),
            None => trace!("frame {} rejected", index),
        }
        let frames_done = index + 1;
        if gate.advance(frames_done).is_break() && frames_done < frames_total {
            debug!("scan interrupted after {} frames", frames_done);
            return Err(ConvertError::Interrupted {
                frames_done,
                frames_total,
            });
        }
    }
    Ok(pitches)
}
