use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use difcodec::dif::{self, BitReader, BitWriter, QuantizationTable};
use difcodec::picture::{ColorType, Picture};
use std::fs;
use std::path::Path;

fn gen_noise(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// Smooth gradient with mild noise, the kind of content prediction favours.
fn gen_photo_like(width: usize, height: usize, channels: usize, seed: u64) -> Vec<u8> {
    let noise = gen_noise(width * height * channels, seed);
    let mut out = Vec::with_capacity(noise.len());
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let base = (x * 255 / width.max(1) + y * 64 / height.max(1) + c * 40) as u32;
                let n = u32::from(noise[out.len()] & 0x07);
                out.push(((base + n) % 256) as u8);
            }
        }
    }
    out
}

fn picture(width: usize, height: usize, color: ColorType, pixels: Vec<u8>) -> Picture {
    Picture::new(width, height, color, pixels).unwrap()
}

fn write_ratio_snapshot() {
    let mut csv = String::from("content,width,height,channels,dif_bytes,raw_bytes,ratio\n");
    for (name, pixels) in [
        ("photo_like", gen_photo_like(512, 512, 3, 1)),
        ("noise", gen_noise(512 * 512 * 3, 2)),
        ("flat", vec![128u8; 512 * 512 * 3]),
    ] {
        let raw = pixels.len();
        let encoded = dif::encode(&picture(512, 512, ColorType::Rgb, pixels)).unwrap();
        let ratio = encoded.len() as f64 / raw as f64;
        csv.push_str(&format!("{name},512,512,3,{},{raw},{ratio}\n", encoded.len()));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_encoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("encoding_speed_mb_s");
    for side in [64usize, 256, 1024] {
        let pic = picture(side, side, ColorType::Rgb, gen_photo_like(side, side, 3, 1));
        g.throughput(Throughput::Bytes(pic.pixels().len() as u64));
        g.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                let out = dif::encode(black_box(&pic)).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decoding_speed_mb_s");
    for side in [64usize, 256, 1024] {
        let pic = picture(side, side, ColorType::Rgb, gen_photo_like(side, side, 3, 2));
        let encoded = dif::encode(&pic).unwrap();
        g.throughput(Throughput::Bytes(pic.pixels().len() as u64));
        g.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                let out = dif::decode(black_box(&encoded)).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_content_kinds(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("encode_by_content");
    let side = 512;
    for (name, pixels) in [
        ("photo_like", gen_photo_like(side, side, 1, 3)),
        ("noise", gen_noise(side * side, 4)),
        ("flat", vec![0u8; side * side]),
    ] {
        let pic = picture(side, side, ColorType::Gray, pixels);
        g.throughput(Throughput::Bytes(pic.pixels().len() as u64));
        g.bench_function(name, |b| {
            b.iter(|| black_box(dif::encode(black_box(&pic)).unwrap()));
        });
    }
    g.finish();
}

fn bench_quantizer(c: &mut Criterion) {
    let mut g = c.benchmark_group("quantizer_bitstream");
    let values = gen_noise(1 << 16, 5);
    let table = QuantizationTable::STANDARD;
    g.throughput(Throughput::Elements(values.len() as u64));
    g.bench_function("write_values", |b| {
        b.iter(|| {
            let mut w = BitWriter::with_capacity(dif::bitstream::payload_capacity(values.len()));
            for &v in &values {
                table.write_value(&mut w, v).unwrap();
            }
            black_box(w.into_bytes());
        });
    });

    let mut w = BitWriter::with_capacity(dif::bitstream::payload_capacity(values.len()));
    for &v in &values {
        table.write_value(&mut w, v).unwrap();
    }
    let packed = w.into_bytes();
    g.bench_function("read_values", |b| {
        b.iter(|| {
            let mut r = BitReader::new(black_box(&packed));
            let mut sum = 0u64;
            for _ in 0..values.len() {
                sum += u64::from(table.read_value(&mut r).unwrap());
            }
            black_box(sum);
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_encoding_speed,
    bench_decoding_speed,
    bench_content_kinds,
    bench_quantizer
);
criterion_main!(benches);
