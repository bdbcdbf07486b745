//! Fuzz target for `TimeStampList` text decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lmsmeta::extract::timestamp::fuzz_decode_timestamp_list;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = fuzz_decode_timestamp_list(text);
    }
});
