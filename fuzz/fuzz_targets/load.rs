#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use roasted_gic::loader::{load_str, LoadOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let options = LoadOptions {
            as_of: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..LoadOptions::default()
        };
        let _ = load_str(input, &options);
    }
});
