#![no_main]

use libfuzzer_sys::fuzz_target;
use debugscope::metadata::sequencepoints::parse_sequence_points;

fuzz_target!(|data: &[u8]| {
    let _ = parse_sequence_points(data);
});
