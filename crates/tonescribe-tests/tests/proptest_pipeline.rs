//! Property-based tests for the pipeline stages using proptest.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tonescribe-tests --test proptest_pipeline
//! ```

use proptest::prelude::*;

use tonescribe_core::smf::{decode_vlq, encode_spans, encode_vlq, vlq_len, SmfValidator};
use tonescribe_core::{
    convert, quantize, sequence_levels, ConvertError, ConvertParams, NoteSpan, TempoMap,
};

// ============================================================================
// 1. Note Sequencing
// ============================================================================

proptest! {
    /// Spans cover the contour exactly and no two neighbours share a level.
    #[test]
    fn spans_partition_contour(levels in prop::collection::vec(0u32..6, 1..300)) {
        let seq = sequence_levels(&levels).unwrap();

        prop_assert_eq!(seq.total_frames(), levels.len() as u64);
        prop_assert!(seq.spans.iter().all(|s| s.duration_frames >= 1));
        prop_assert!(seq.spans.windows(2).all(|w| w[0].level != w[1].level));

        let expanded: Vec<u32> = seq
            .spans
            .iter()
            .flat_map(|s| std::iter::repeat(s.level).take(s.duration_frames as usize))
            .collect();
        prop_assert_eq!(expanded, levels.clone());
    }

    /// The unique-level table lists each level once, in first-occurrence order.
    #[test]
    fn unique_levels_in_first_occurrence_order(levels in prop::collection::vec(0u32..10, 1..200)) {
        let seq = sequence_levels(&levels).unwrap();

        let mut expected = Vec::new();
        for &l in &levels {
            if !expected.contains(&l) {
                expected.push(l);
            }
        }
        prop_assert_eq!(seq.unique_levels, expected);
    }
}

// ============================================================================
// 2. Quantization
// ============================================================================

proptest! {
    /// Levels stay within range and the maximum lands on the top bin.
    #[test]
    fn levels_within_bins(
        pitches in prop::collection::vec(20.0f64..110.0, 1..200),
        num_bins in 1u32..64,
    ) {
        let q = quantize(&pitches, num_bins).unwrap();
        prop_assert_eq!(q.levels.len(), pitches.len());
        prop_assert!(q.levels.iter().all(|&l| l <= num_bins));

        if q.max > q.min {
            let top = pitches.iter().position(|&p| p == q.max).unwrap();
            prop_assert_eq!(q.levels[top], num_bins);
            let bottom = pitches.iter().position(|&p| p == q.min).unwrap();
            prop_assert_eq!(q.levels[bottom], 0);
        } else {
            prop_assert!(q.levels.iter().all(|&l| l == 0));
        }
    }

    /// A constant contour always maps to level 0.
    #[test]
    fn flat_contour_is_level_zero(pitch in 20.0f64..110.0, len in 1usize..100, num_bins in 1u32..64) {
        let q = quantize(&vec![pitch; len], num_bins).unwrap();
        prop_assert!(q.levels.iter().all(|&l| l == 0));
    }

    /// Higher pitches never get lower levels.
    #[test]
    fn quantization_is_monotonic(
        pitches in prop::collection::vec(20.0f64..110.0, 2..100),
        num_bins in 1u32..32,
    ) {
        let q = quantize(&pitches, num_bins).unwrap();
        for i in 0..pitches.len() {
            for j in 0..pitches.len() {
                if pitches[i] <= pitches[j] {
                    prop_assert!(q.levels[i] <= q.levels[j]);
                }
            }
        }
    }
}

// ============================================================================
// 3. Variable-Length Quantities
// ============================================================================

proptest! {
    /// Encoding is minimal and decodes back to the same value.
    #[test]
    fn vlq_minimal_and_invertible(value in any::<u32>()) {
        let bytes = encode_vlq(value);
        prop_assert_eq!(bytes.len(), vlq_len(value));
        prop_assert!(bytes.len() == 1 || bytes[0] != 0x80);
        prop_assert!(bytes[..bytes.len() - 1].iter().all(|b| b & 0x80 != 0));
        prop_assert_eq!(bytes[bytes.len() - 1] & 0x80, 0);
        prop_assert_eq!(decode_vlq(&bytes), Some((value, bytes.len())));
    }
}

// ============================================================================
// 4. SMF Structure
// ============================================================================

fn arbitrary_spans() -> impl Strategy<Value = Vec<NoteSpan>> {
    prop::collection::vec((0u32..=67, 1u32..5000), 1..100).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(level, duration_frames)| NoteSpan {
                level,
                duration_frames,
            })
            .collect()
    })
}

proptest! {
    /// Encoded spans validate and decode back to the same notes.
    #[test]
    fn encoded_spans_validate(spans in arbitrary_spans(), ticks_per_frame in 1u32..100) {
        let tempo = TempoMap { ticks_per_frame };
        let bytes = encode_spans(&spans, &tempo).unwrap();

        prop_assert_eq!(&bytes[0..4], b"MThd");
        let declared = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]);
        prop_assert_eq!(declared as usize, bytes.len() - 22);

        let report = SmfValidator::validate(&bytes).unwrap();
        prop_assert_eq!(report.tracks.len(), 1);
        prop_assert!(report.tracks[0].has_end_of_track);

        let durations: Vec<u64> = report.notes().map(|n| n.duration_ticks).collect();
        let expected: Vec<u64> = spans
            .iter()
            .map(|s| s.duration_frames as u64 * ticks_per_frame as u64)
            .collect();
        prop_assert_eq!(durations, expected);
    }

    /// The validator never panics on arbitrary bytes.
    #[test]
    fn validator_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = SmfValidator::validate(&data);
    }

    /// The validator never panics on corrupted encoder output.
    #[test]
    fn validator_survives_corruption(
        spans in arbitrary_spans(),
        index in any::<prop::sample::Index>(),
        byte in any::<u8>(),
    ) {
        let mut bytes = encode_spans(&spans, &TempoMap { ticks_per_frame: 1 }).unwrap();
        let i = index.index(bytes.len());
        bytes[i] = byte;
        let _ = SmfValidator::validate(&bytes);
    }
}

// ============================================================================
// 5. Pipeline
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Arbitrary audio either converts to a valid file or reports a known
    /// outcome; it never panics.
    #[test]
    fn pipeline_never_panics(
        samples in prop::collection::vec(-1.0f32..1.0, 0..8192),
        num_bins in 1u32..24,
    ) {
        match convert(&samples, 8000, &ConvertParams::new(num_bins).with_window(512, 256)) {
            Ok(bytes) => {
                prop_assert!(SmfValidator::validate(&bytes).is_ok());
            }
            Err(ConvertError::EmptyInput { .. }) | Err(ConvertError::NoPitchDetected { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
