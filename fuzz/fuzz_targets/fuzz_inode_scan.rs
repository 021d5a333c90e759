#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use xfscan::InodeClassifier;
use xfscan::scanner::scan_inodes;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = scan_inodes(&mut Cursor::new(data)) {
        let classified = InodeClassifier::default().classify(&records);
        assert_eq!(classified.len(), records.len());
    }
});
