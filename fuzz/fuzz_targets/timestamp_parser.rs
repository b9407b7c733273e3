#![no_main]

use libfuzzer_sys::fuzz_target;
use racebar::bucket::bucketize;
use racebar::event::Timestamp;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any parsed timestamp must bucketize and display without panicking
        if let Ok(ts) = Timestamp::parse(input) {
            let (day, month) = bucketize(&ts);
            let _ = (day.to_string(), month.to_string(), ts.to_string());
        }
    }
});
