//! Criterion benchmarks for loading and classifying program text.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use dots_bench::{operator_blocks, parallel_tracks, program, ring};
use dots_grid::{Loader, MemorySource};

fn bench_load_large_ring(c: &mut Criterion) {
    let text = ring(200, 200);
    c.bench_function("load_ring_200x200", |b| {
        b.iter(|| black_box(program(&text).unwrap()));
    });
}

fn bench_load_many_starts(c: &mut Criterion) {
    let text = parallel_tracks(2_000, 32);
    c.bench_function("load_2k_starts", |b| {
        b.iter(|| black_box(program(&text).unwrap()));
    });
}

fn bench_load_operators(c: &mut Criterion) {
    let text = operator_blocks(1_000);
    c.bench_function("load_1k_operators", |b| {
        b.iter(|| black_box(program(&text).unwrap()));
    });
}

fn bench_library_instancing(c: &mut Criterion) {
    let links = vec![".-f-"; 256].join("\n");
    let text = format!("%!loop.dots f\n{links}");
    let source = MemorySource::new().with_file("loop.dots", "%^X\n/-X-\\\n\\---/");
    let loader = Loader::new(source);
    c.bench_function("load_256_library_instances", |b| {
        b.iter(|| black_box(loader.load_str(&text, "").unwrap()));
    });
}

criterion_group!(
    benches,
    bench_load_large_ring,
    bench_load_many_starts,
    bench_load_operators,
    bench_library_instancing
);
criterion_main!(benches);
