#![no_main]

use libfuzzer_sys::fuzz_target;
use tonescribe_core::{convert, ConvertParams, SmfValidator};

// First byte picks the bin count, the rest are 16-bit little-endian samples.
fuzz_target!(|data: &[u8]| {
    let Some((&bins, rest)) = data.split_first() else {
        return;
    };
    let samples: Vec<f32> = rest
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
        .collect();

    let params = ConvertParams::new(bins as u32 % 64).with_window(256, 128);
    if let Ok(bytes) = convert(&samples, 8000, &params) {
        assert!(SmfValidator::validate(&bytes).is_ok());
    }
});
