#![no_main]
use libfuzzer_sys::fuzz_target;
use difcodec::dif;

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    if let Ok(picture) = dif::decode(data) {
        assert!(picture.pixels().iter().all(|p| p & 1 == 0));
    }

    // Same bytes behind a valid gray header.
    let mut framed = vec![0xFF, 0xD1, 0x08, 0x00, 0x08, 0x00, 0x04, 0x01, 0x02, 0x04, 0x08, 0x40];
    framed.extend_from_slice(data);
    let _ = dif::decode(&framed);
});
