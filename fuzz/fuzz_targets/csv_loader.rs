#![no_main]

use libfuzzer_sys::fuzz_target;
use racebar::loader::{parse_events, LoaderConfig, MalformedPolicy};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Neither policy may panic; skip must never report more rows than it read
        let _ = parse_events(input, &LoaderConfig::default());

        let skip = LoaderConfig {
            on_malformed: MalformedPolicy::Skip,
            ..LoaderConfig::default()
        };
        if let Ok(loaded) = parse_events(input, &skip) {
            assert!(loaded.events.len() + loaded.rows_skipped == loaded.rows_read);
        }
    }
});
