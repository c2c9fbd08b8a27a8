#![no_main]
use cfxml::{from_str, to_string_with, WriteConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(doc) = from_str(s) {
            let written = to_string_with(&doc, &WriteConfig::verbatim());
            assert_eq!(written, s.strip_prefix('\u{feff}').unwrap_or(s));
        }
    }
});
