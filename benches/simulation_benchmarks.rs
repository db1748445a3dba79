//! Ball-Drop Benchmarks with 95% Confidence Intervals
//!
//! Statistical setup:
//! - Sample size: 100 iterations per benchmark
//! - Confidence intervals: 95% (Criterion default)
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pidrop::config::DropConfig;
use pidrop::domains::sampler::{BatchGenerator, DiscSampler};
use pidrop::domains::tracker::ConvergenceTracker;
use pidrop::engine::{Disc, DropEngine, Point, SimRng};

/// Sampler throughput: area-uniform landing points per second
fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sampler");
    group.sample_size(100);
    group.confidence_level(0.95);

    let Ok(disc) = Disc::new(Point::ORIGIN, 300.0) else {
        return;
    };
    let sampler = DiscSampler::new(disc);

    for n in [1_000_u64, 10_000, 100_000] {
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::new("generate", n), &n, |b, &n| {
            let mut rng = SimRng::new(42);
            let mut batches = BatchGenerator::new();
            let mut balls = Vec::with_capacity(n as usize);
            b.iter(|| {
                balls.clear();
                batches.generate(&sampler, &mut rng, n, &mut balls);
                black_box(balls.len())
            });
        });
    }

    group.finish();
}

/// One engine tick over a full collection of falling balls
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tick");
    group.sample_size(100);

    for n in [1_000_u64, 10_000, 100_000] {
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::new("settle", n), &n, |b, &n| {
            let Ok(mut engine) = DropEngine::new(&DropConfig::default()) else {
                return;
            };
            b.iter(|| {
                engine.reset();
                let _ = engine.drop_balls(n);
                black_box(engine.run_until_settled(1_000))
            });
        });
    }

    group.finish();
}

/// Incremental tracker update per landing
fn bench_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tracker");
    group.sample_size(100);
    group.throughput(Throughput::Elements(10_000));

    let landings: Vec<bool> = (0..10_000).map(|i| i % 11 < 7).collect();
    group.bench_function("record_10k_landings", |b| {
        let mut tracker = ConvergenceTracker::default();
        b.iter(|| {
            tracker.reset();
            black_box(tracker.record_landings(landings.iter().copied()))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_sampler, bench_tick, bench_tracker);
criterion_main!(benches);
