#![no_main]
use libfuzzer_sys::fuzz_target;
use difcodec::dif;
use difcodec::picture::{ColorType, Picture};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the layout and width, the rest are samples.
    let flags = data[0];
    let color = if flags & 1 != 0 { ColorType::Rgb } else { ColorType::Gray };
    let width = usize::from(flags >> 1).max(1);
    let samples = &data[1..];
    let row = width * color.channels();
    let height = (samples.len() / row).min(usize::from(u16::MAX));
    if height == 0 {
        return;
    }

    let pixels = samples[..row * height].to_vec();
    let picture = Picture::new(width, height, color, pixels).unwrap();
    let encoded = dif::encode(&picture).unwrap();
    let decoded = dif::decode(&encoded).unwrap();

    assert_eq!(decoded.width(), width);
    assert_eq!(decoded.height(), height);
    for (got, orig) in decoded.pixels().iter().zip(picture.pixels()) {
        assert_eq!(*got, orig & 0xFE);
    }
});
