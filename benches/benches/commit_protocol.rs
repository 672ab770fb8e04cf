//! Commit protocol benchmarks
//!
//! Run with: cargo bench --bench commit_protocol

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jxl_core::{ColorEncoding, DataType, PixelFormat};
use jxl_encoder::Encoder;
use jxl_engine::{CallLog, ParallelRunner, RecordingEngine};

fn create_encoder(size: u32, frames: usize) -> Encoder {
    let mut encoder = Encoder::new();
    encoder
        .color_encoding(ColorEncoding::srgb())
        .size(size, size)
        .bits_per_sample(8)
        .num_channels(3, 0)
        .unwrap();
    encoder.add_box("Exif").unwrap().commit(vec![0u8; 64]);
    let data: Vec<u8> = (0..size * size * 3).map(|i| i as u8).collect();
    for i in 0..frames {
        encoder
            .new_frame_with_duration(i as u32)
            .quality(90.0)
            .commit(PixelFormat::new(3, DataType::U8), data.clone())
            .unwrap();
    }
    encoder
}

fn bench_recording_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("Commit Protocol");
    let runner = ParallelRunner::new().unwrap();

    for &frames in &[1usize, 8, 64] {
        let encoder = create_encoder(16, frames);
        group.throughput(Throughput::Elements(frames as u64));
        group.bench_with_input(BenchmarkId::new("recording", frames), &encoder, |b, encoder| {
            b.iter(|| {
                let mut out = Vec::new();
                encoder
                    .encode_with(
                        || RecordingEngine::new(CallLog::new()),
                        &runner,
                        black_box(&mut out),
                    )
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_builtin_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("Built-in Engine");
    let runner = ParallelRunner::new().unwrap();

    for &size in &[64u32, 256] {
        let mut encoder = Encoder::new();
        encoder
            .color_encoding(ColorEncoding::srgb())
            .size(size, size)
            .bits_per_sample(8)
            .num_channels(3, 0)
            .unwrap();
        let data: Vec<u8> = (0..size * size * 3).map(|i| (i % 251) as u8).collect();
        encoder
            .new_frame()
            .effort(3)
            .commit(PixelFormat::new(3, DataType::U8), data)
            .unwrap();

        group.throughput(Throughput::Elements(u64::from(size * size)));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &encoder,
            |b, encoder| b.iter(|| encoder.encode(black_box(&runner)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_recording_engine, bench_builtin_engine);
criterion_main!(benches);
