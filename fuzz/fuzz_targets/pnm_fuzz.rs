#![no_main]
use libfuzzer_sys::fuzz_target;
use difcodec::{dif, pnm};

fuzz_target!(|data: &[u8]| {
    // Whatever parses as PNM must survive the DIF round trip when it fits.
    if let Ok(picture) = pnm::decode(data) {
        if let Ok(encoded) = dif::encode(&picture) {
            let decoded = dif::decode(&encoded).unwrap();
            assert_eq!(decoded.pixels().len(), picture.pixels().len());
        }
    }
});
