//! Per-frame dominant pitch estimation.
//!
//! The estimator is a time-domain magnitude-peak heuristic: the index of the
//! loudest sample in a frame stands in for a spectral bin, and that bin is
//! converted to a frequency as if the frame had been transformed. It is not a
//! pitch tracker, and output compatibility depends on keeping it exactly as
//! written here.

/// Lower bound of the accepted frequency band in Hz (exclusive).
pub const MIN_FREQUENCY_HZ: f64 = 50.0;

/// Upper bound of the accepted frequency band in Hz (exclusive).
pub const MAX_FREQUENCY_HZ: f64 = 2000.0;

/// Reference pitch: A4 in Hz.
pub const A4_FREQUENCY_HZ: f64 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI_NOTE: f64 = 69.0;

/// Index of the largest absolute sample in a frame.
///
/// The first index wins on ties. Returns 0 for an empty frame. NaN samples
/// never compare greater and so are never selected after index 0.
pub fn peak_index(frame: &[f32]) -> usize {
    let mut best_index = 0;
    let mut best = f32::NEG_INFINITY;
    for (i, &sample) in frame.iter().enumerate() {
        let magnitude = sample.abs();
        if magnitude > best {
            best = magnitude;
            best_index = i;
        }
    }
    best_index
}

/// Converts a peak index to the frequency of the matching bin.
pub fn index_to_frequency(index: usize, sample_rate: u32, frame_size: usize) -> f64 {
    if frame_size == 0 {
        return 0.0;
    }
    index as f64 * sample_rate as f64 / frame_size as f64
}

/// Converts a frequency in Hz to a fractional MIDI note number.
pub fn frequency_to_midi(freq: f64) -> f64 {
    A4_MIDI_NOTE + 12.0 * (freq / A4_FREQUENCY_HZ).log2()
}

/// Whether a frequency falls inside the open audible band.
pub fn in_audible_band(freq: f64) -> bool {
    freq > MIN_FREQUENCY_HZ && freq < MAX_FREQUENCY_HZ
}

/// Estimates the pitch of one frame as a fractional MIDI note number.
///
/// Returns `None` when the implied frequency lies outside the band. A silent
/// frame peaks at index 0, i.e. 0 Hz, and is rejected.
pub fn estimate_pitch(frame: &[f32], sample_rate: u32) -> Option<f64> {
    let freq = index_to_frequency(peak_index(frame), sample_rate, frame.len());
    if in_audible_band(freq) {
        Some(frequency_to_midi(freq))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(len: usize, at: usize, value: f32) -> Vec<f32> {
        let mut frame = vec![0.0; len];
        frame[at] = value;
        frame
    }

    #[test]
    fn test_peak_index_uses_magnitude() {
        let frame = [0.1, -0.9, 0.5, 0.8];
        assert_eq!(peak_index(&frame), 1);
    }

    #[test]
    fn test_peak_index_first_wins_on_tie() {
        let frame = [0.0, 0.5, -0.5, 0.5];
        assert_eq!(peak_index(&frame), 1);
    }

    #[test]
    fn test_peak_index_degenerate_frames() {
        assert_eq!(peak_index(&[]), 0);
        assert_eq!(peak_index(&[0.0; 16]), 0);
        assert_eq!(peak_index(&[f32::NAN, 0.25, f32::NAN]), 1);
    }

    #[test]
    fn test_frequency_to_midi_reference_points() {
        assert!((frequency_to_midi(440.0) - 69.0).abs() < 1e-12);
        assert!((frequency_to_midi(880.0) - 81.0).abs() < 1e-12);
        assert!((frequency_to_midi(261.625_565_3) - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_index_to_frequency() {
        // 20 * 44100 / 2048
        let freq = index_to_frequency(20, 44100, 2048);
        assert!((freq - 430.664_062_5).abs() < 1e-9);
        assert_eq!(index_to_frequency(5, 44100, 0), 0.0);
    }

    #[test]
    fn test_silent_frame_has_no_pitch() {
        assert_eq!(estimate_pitch(&[0.0; 2048], 44100), None);
    }

    #[test]
    fn test_band_edges_are_exclusive() {
        // 100 samples at 5000 Hz: bin k is k * 50 Hz.
        assert_eq!(estimate_pitch(&impulse(100, 1, 1.0), 5000), None);
        assert!(estimate_pitch(&impulse(100, 2, 1.0), 5000).is_some());
        assert!(estimate_pitch(&impulse(100, 39, 1.0), 5000).is_some());
        assert_eq!(estimate_pitch(&impulse(100, 40, 1.0), 5000), None);
    }

    #[test]
    fn test_impulse_pitch_matches_formula() {
        let frame = impulse(2048, 20, -0.7);
        let pitch = estimate_pitch(&frame, 44100).unwrap();
        let expected = 69.0 + 12.0 * (430.664_062_5f64 / 440.0).log2();
        assert!((pitch - expected).abs() < 1e-9);
    }

    #[test]
    fn test_high_index_rejected() {
        // 200 * 44100 / 2048 is about 4306 Hz.
        assert_eq!(estimate_pitch(&impulse(2048, 200, 1.0), 44100), None);
    }
}
