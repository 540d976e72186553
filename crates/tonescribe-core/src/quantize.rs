//! Global min/max quantization of a pitch contour into integer levels.

use crate::error::{ConvertError, ConvertResult};

/// A quantized level contour together with the range it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantization {
    /// One level per pitch, each in `0..=num_bins`.
    pub levels: Vec<u32>,
    /// Smallest pitch in the contour.
    pub min: f64,
    /// Largest pitch in the contour.
    pub max: f64,
    /// Width of one level in semitones (0 for a flat contour).
    pub step: f64,
    /// Bin count the contour was quantized with.
    pub num_bins: u32,
}

impl Quantization {
    /// Whether every pitch in the contour was identical.
    pub fn is_flat(&self) -> bool {
        self.step == 0.0
    }
}

/// Quantizes a pitch contour into levels `round((v - min) / step)` where
/// `step = (max - min) / num_bins`.
///
/// The maximum pitch lands on exactly `num_bins`, so levels span
/// `0..=num_bins`. A flat contour (including one whose range is too small to
/// divide) maps every value to level 0.
pub fn quantize(pitches: &[f64], num_bins: u32) -> ConvertResult<Quantization> {
    if num_bins == 0 {
        return Err(ConvertError::invalid_param(
            "num_bins",
            "must be greater than 0",
        ));
    }
    if pitches.is_empty() {
        return Err(ConvertError::invalid_param(
            "pitches",
            "cannot quantize an empty contour",
        ));
    }

    let (min, max) = pitches
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let step = (max - min) / num_bins as f64;
    if !(step.is_finite() && step > 0.0) {
        return Ok(Quantization {
            levels: vec![0; pitches.len()],
            min,
            max,
            step: 0.0,
            num_bins,
        });
    }

    let levels = pitches
        .iter()
        .map(|&v| {
            let level = ((v - min) / step).round();
            // Float error cannot push a value past the top bin.
            level.clamp(0.0, num_bins as f64) as u32
        })
        .collect();

    Ok(Quantization {
        levels,
        min,
        max,
        step,
        num_bins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_maps_range_onto_bins() {
        let q = quantize(&[60.0, 62.0, 64.0, 68.0], 4).unwrap();
        assert_eq!(q.levels, vec![0, 1, 2, 4]);
        assert_eq!(q.min, 60.0);
        assert_eq!(q.max, 68.0);
        assert_eq!(q.step, 2.0);
        assert!(!q.is_flat());
    }

    #[test]
    fn test_max_lands_on_num_bins() {
        let pitches = [57.3, 61.9, 70.25, 66.0];
        for bins in [1, 2, 7, 8, 12, 64] {
            let q = quantize(&pitches, bins).unwrap();
            assert_eq!(q.levels[2], bins, "bins = {}", bins);
            assert_eq!(q.levels[0], 0);
            assert!(q.levels.iter().all(|&l| l <= bins));
        }
    }

    #[test]
    fn test_rounds_half_up() {
        // step = 1.0; 0.5 rounds up to 1, 1.49 rounds down to 1.
        let q = quantize(&[0.0, 0.5, 1.49, 2.0], 2).unwrap();
        assert_eq!(q.levels, vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_flat_contour_maps_to_zero() {
        let q = quantize(&[68.63; 5], 8).unwrap();
        assert_eq!(q.levels, vec![0; 5]);
        assert!(q.is_flat());
    }

    #[test]
    fn test_single_value_maps_to_zero() {
        let q = quantize(&[42.0], 3).unwrap();
        assert_eq!(q.levels, vec![0]);
    }

    #[test]
    fn test_rejects_zero_bins() {
        let err = quantize(&[60.0, 61.0], 0).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidParameter { ref name, .. } if name == "num_bins"));
    }

    #[test]
    fn test_rejects_empty_contour() {
        let err = quantize(&[], 4).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidParameter { .. }));
    }

    #[test]
    fn test_levels_align_with_pitches() {
        let pitches: Vec<f64> = (0..50).map(|i| 40.0 + (i as f64 * 0.37).sin() * 12.0).collect();
        let q = quantize(&pitches, 10).unwrap();
        assert_eq!(q.levels.len(), pitches.len());
    }
}
