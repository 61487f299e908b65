#![no_main]

use libfuzzer_sys::fuzz_target;
use debugscope::metadata::customdebuginformation::{encode_custom_debug_info, parse_custom_debug_info};

fuzz_target!(|data: &[u8]| {
    let Ok(records) = parse_custom_debug_info(data) else {
        return;
    };
    if let Ok(blob) = encode_custom_debug_info(&records) {
        assert_eq!(parse_custom_debug_info(&blob).ok(), Some(records));
    }
});
