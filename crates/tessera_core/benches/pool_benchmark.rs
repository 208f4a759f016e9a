//! # Pool Benchmark
//!
//! Measures the alive/dead transitions used by every transient-actor
//! system: a burst of spawns followed by the per-frame retain loop.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::Pool;

#[derive(Clone, Copy, Default)]
struct Pulse {
    lifetime: f32,
    distance: f32,
}

fn bench_acquire_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_acquire_release");

    for capacity in [64usize, 1_024, 16_384] {
        let mut pool = Pool::new(capacity, |_| Pulse::default());
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| {
                while let Some(handle) = pool.acquire() {
                    black_box(handle);
                }
                pool.clear();
            });
        });
    }

    group.finish();
}

fn bench_retain_frame(c: &mut Criterion) {
    let mut pool = Pool::new(4_096, |i| Pulse {
        lifetime: (i % 60) as f32 / 60.0,
        distance: 0.0,
    });

    c.bench_function("pool_retain_4096", |b| {
        b.iter(|| {
            while pool.acquire().is_some() {}
            pool.retain(|_, pulse| {
                pulse.distance += 0.5;
                pulse.lifetime > 0.5
            });
            black_box(pool.alive_count());
            pool.clear();
        });
    });
}

criterion_group!(benches, bench_acquire_release, bench_retain_frame);
criterion_main!(benches);
