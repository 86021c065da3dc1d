//! Fuzz target: `parse_line`
//!
//! Drives arbitrary detector output through the line classifier and
//! asserts that it never panics and never accepts a detection under the
//! threshold or with an empty breed.
//!
//! cargo fuzz run fuzz_detection_line

#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use petfeeder::detection::{parse_line, Line};

const THRESHOLD: f32 = 0.85;

fuzz_target!(|data: &[u8]| {
    let Some(at) = NaiveDate::from_ymd_opt(2024, 5, 1).and_then(|d| d.and_hms_opt(12, 0, 0)) else {
        return;
    };
    let line = String::from_utf8_lossy(data);

    if let Ok(Line::Detection(event)) = parse_line(&line, THRESHOLD, at) {
        assert!(event.confidence >= THRESHOLD, "accepted a low-confidence detection");
        assert!(!event.breed.trim().is_empty(), "accepted an empty breed");
        assert_eq!(event.observed_at, at);
    }
});
