#![no_main]

use libfuzzer_sys::fuzz_target;
use xfscan::shortform::scan_shortform;

fuzz_target!(|data: &[u8]| {
    for record in scan_shortform(data) {
        assert!(record.entry_count > 0);
        assert!(record.physical_offset as usize + 256 <= data.len());
    }
});
