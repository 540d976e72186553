#![no_main]

use libfuzzer_sys::fuzz_target;
use tonescribe_core::SmfValidator;

fuzz_target!(|data: &[u8]| {
    let _ = SmfValidator::validate(data);
});
