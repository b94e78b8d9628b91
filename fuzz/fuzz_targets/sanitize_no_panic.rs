#![no_main]

use html_sanitizer::{AllowList, Sanitizer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let sanitizer = Sanitizer::with_allow_list(AllowList::parse_delimited(
        "a|b|i|p|div|img|style|svg|template",
    ));
    let _ = sanitizer.sanitize_bytes(data, None);
    let _ = sanitizer.sanitize_bytes(data, Some("text/html; charset=windows-1252"));
});
