//! Performance benchmarks for the check functions.
//!
//! Measures CRC-32 and Adler-32 throughput across data sizes, plus the
//! cost of the algebraic combine operations used by chunked-parallel
//! compression.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ferroflate_core::checksum::{Adler32, Crc32, adler32_combine, crc32_combine};
use std::hint::black_box;

/// Reproducible pseudo-random data.
fn random(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x123456789ABCDEF0;
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");
    for size in [64usize, 4096, 65536, 1 << 20] {
        let data = random(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| Crc32::compute(black_box(data)));
        });
    }
    group.finish();
}

fn bench_adler32(c: &mut Criterion) {
    let mut group = c.benchmark_group("adler32");
    for size in [64usize, 4096, 65536, 1 << 20] {
        let data = random(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| Adler32::compute(black_box(data)));
        });
    }
    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let a = random(65536);
    let b = random(65536);
    let crc_a = Crc32::compute(&a);
    let crc_b = Crc32::compute(&b);
    let adler_a = Adler32::compute(&a);
    let adler_b = Adler32::compute(&b);

    c.bench_function("crc32_combine", |bench| {
        bench.iter(|| crc32_combine(black_box(crc_a), black_box(crc_b), b.len() as u64));
    });
    c.bench_function("adler32_combine", |bench| {
        bench.iter(|| adler32_combine(black_box(adler_a), black_box(adler_b), b.len() as u64));
    });
}

criterion_group!(benches, bench_crc32, bench_adler32, bench_combine);
criterion_main!(benches);
