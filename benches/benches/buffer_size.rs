//! Buffer size formula benchmarks
//!
//! Run with: cargo bench --bench buffer_size

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jxl_core::{downsampled_extent, DataType, PixelFormat};

fn bench_required_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("Required Size");

    for &(channels, data_type, align) in &[
        (3, DataType::U8, 0),
        (4, DataType::U16, 8),
        (1, DataType::F32, 64),
        (3, DataType::F16, 3),
    ] {
        let format = PixelFormat::new(channels, data_type).with_align(align);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{:?}/align{}", channels, data_type, align)),
            &format,
            |b, format| {
                b.iter(|| format.required_size(black_box(3840), black_box(2160)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_check_size(c: &mut Criterion) {
    let format = PixelFormat::new(3, DataType::U8);
    c.bench_function("check_size_exact", |b| {
        b.iter(|| {
            format
                .check_size(black_box(1920), black_box(1080), black_box(1920 * 1080 * 3))
                .unwrap()
        });
    });

    c.bench_function("downsampled_extent", |b| {
        b.iter(|| {
            (1..=8u32)
                .map(|f| downsampled_extent(black_box(4095), f))
                .sum::<u32>()
        });
    });
}

criterion_group!(benches, bench_required_size, bench_check_size);
criterion_main!(benches);
