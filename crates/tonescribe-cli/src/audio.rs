//! WAV decoding for the pipeline.
//!
//! Only the first channel of a multi-channel file is analysed. Integer PCM
//! samples are normalized to `[-1, 1]` by their bit depth; float samples are
//! passed through.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

/// Decoded mono samples plus the properties of the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Samples of the first channel.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source.
    pub channels: u16,
    /// Bits per sample of the source.
    pub bits_per_sample: u16,
}

impl DecodedAudio {
    /// Duration of the analysed channel in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f64 / self.sample_rate as f64
        }
    }
}

/// Loads a WAV file from disk.
pub fn load_wav(path: &Path) -> Result<DecodedAudio> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file '{}'", path.display()))?;
    decode(reader).with_context(|| format!("Failed to decode '{}'", path.display()))
}

/// Decodes WAV data from any reader.
pub fn decode_wav<R: Read>(source: R) -> Result<DecodedAudio> {
    let reader = hound::WavReader::new(source).context("Failed to parse WAV header")?;
    decode(reader)
}

fn decode<R: Read>(reader: hound::WavReader<R>) -> Result<DecodedAudio> {
    let spec = reader.spec();
    if spec.channels == 0 {
        bail!("WAV file declares zero channels");
    }
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => {
            let interleaved: Result<Vec<f32>, _> = reader.into_samples::<f32>().collect();
            first_channel(interleaved.context("Failed to read float samples")?, channels)
        }
        (hound::SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = (1i64 << (bits - 1)) as f32;
            let interleaved: Result<Vec<i32>, _> = reader.into_samples::<i32>().collect();
            first_channel(
                interleaved.with_context(|| format!("Failed to read {}-bit samples", bits))?,
                channels,
            )
            .into_iter()
            .map(|s| s as f32 / scale)
            .collect()
        }
        (format, bits) => bail!(
            "Unsupported WAV encoding: {:?} at {} bits (supported: 8/16/24/32-bit integer, 32-bit float)",
            format,
            bits
        ),
    };

    log::info!(
        "decoded {} samples at {} Hz ({} channel(s), {} bits)",
        samples.len(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
    })
}

/// Keeps every `channels`-th sample starting at the first.
fn first_channel<T: Copy>(interleaved: Vec<T>, channels: usize) -> Vec<T> {
    if channels == 1 {
        return interleaved;
    }
    interleaved.into_iter().step_by(channels).collect()
}
