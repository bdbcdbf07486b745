//! Fuzz target for the full extraction pipeline.
//!
//! Arbitrary bytes go through XML parsing, extraction and validation,
//! checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lmsmeta::config::ExtractOptions;
use lmsmeta::extract::extract_slice;
use lmsmeta::validation::validate_acquisitions;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(acquisitions) = extract_slice(data, &ExtractOptions::default()) {
        let _ = validate_acquisitions(&acquisitions);
    }
});
