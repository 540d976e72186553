//! Synthetic signals and WAV fixtures.

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// CD sample rate used by most fixtures.
pub const SAMPLE_RATE: u32 = 44_100;

/// `seconds` of digital silence.
pub fn silence(seconds: f64, sample_rate: u32) -> Vec<f32> {
    vec![0.0; (seconds * sample_rate as f64).round() as usize]
}

/// A sine tone at `freq` Hz with peak `amplitude`.
pub fn sine(freq: f64, seconds: f64, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let len = (seconds * sample_rate as f64).round() as usize;
    (0..len)
        .map(|i| amplitude * (TAU * freq * i as f64 / sample_rate as f64).sin() as f32)
        .collect()
}

/// Unit impulses every `period` samples starting at `first`.
///
/// With `period` equal to the hop, every frame peaks at the same index, so
/// every frame yields the same pitch.
pub fn pulse_train(len: usize, period: usize, first: usize) -> Vec<f32> {
    let mut samples = vec![0.0; len];
    for i in (first..len).step_by(period.max(1)) {
        samples[i] = 1.0;
    }
    samples
}

/// Concatenated hop-aligned pulse trains, one segment per peak offset.
///
/// Each segment is `frames_per_segment` hops long; the frame peak moves to
/// the given offset, producing a stepped pitch contour.
pub fn stepped_pulses(offsets: &[usize], hop: usize, frames_per_segment: usize) -> Vec<f32> {
    let segment = hop * frames_per_segment;
    let mut samples = vec![0.0; segment * offsets.len() + hop];
    for (s, &offset) in offsets.iter().enumerate() {
        let start = s * segment;
        for i in (start + offset..start + segment).step_by(hop) {
            samples[i] = 1.0;
        }
    }
    samples
}

/// A temporary directory holding WAV fixtures.
pub struct WavFixture {
    pub root: TempDir,
}

impl WavFixture {
    /// Create a new empty fixture directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        Self { root }
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write mono 32-bit float samples.
    pub fn write_float(&self, name: &str, samples: &[f32], sample_rate: u32) -> PathBuf {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let path = self.path().join(name);
        let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create WAV");
        for &s in samples {
            writer.write_sample(s).expect("Failed to write sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
        path
    }

    /// Write mono 16-bit PCM samples, scaling `[-1, 1]` to the full range.
    pub fn write_pcm16(&self, name: &str, samples: &[f32], sample_rate: u32) -> PathBuf {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let path = self.path().join(name);
        let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create WAV");
        for &s in samples {
            let value = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer.write_sample(value).expect("Failed to write sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
        path
    }
}

impl Default for WavFixture {
    fn default() -> Self {
        Self::new()
    }
}
