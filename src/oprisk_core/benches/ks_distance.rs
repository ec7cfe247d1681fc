extern crate criterion;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oprisk_core::prelude::*;
use oprisk_core::stats::kolmogorov_sf;
use pprof::criterion::{Output, PProfProfiler};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn synthetic_losses(num_uoms: usize, loss_events_per_uom: usize) -> polars::prelude::DataFrame {
    let config = GenerationConfig::new(num_uoms, loss_events_per_uom, (5.0, 7.0), (1.0, 2.0));
    generate_synthetic_data(&config, &mut StdRng::seed_from_u64(42)).unwrap()
}

pub fn pair_distance(c: &mut Criterion) {
    let mut pair_group = c.benchmark_group("KS-Pair");

    for size in [100, 1_000, 10_000] {
        let a: Vec<f64> = (0..size).map(|i| (i as f64 * 0.37).sin()).collect();
        let b: Vec<f64> = (0..size).map(|i| (i as f64 * 0.11).cos()).collect();
        pair_group.bench_with_input(BenchmarkId::new("Distance", size), &size, |bench, _| {
            bench.iter(|| ks_distance(black_box(&a), black_box(&b)))
        });
    }
}

pub fn distance_matrix(c: &mut Criterion) {
    let mut matrix_group = c.benchmark_group("KS-Matrix");

    for num_uoms in [5, 20, 50] {
        let table = synthetic_losses(num_uoms, 100);
        matrix_group.bench_with_input(BenchmarkId::new("UoMs", num_uoms), &table, |b, t| {
            b.iter(|| uom_distance_matrix(black_box(t)).unwrap())
        });
    }
}

pub fn p_values(c: &mut Criterion) {
    let mut sf_group = c.benchmark_group("Kolmogorov-SF");

    for n in [10, 100, 1_000, 5_000] {
        sf_group.bench_with_input(BenchmarkId::new("Samples", n), &n, |b, n| {
            b.iter(|| kolmogorov_sf(black_box(*n), black_box(0.05)))
        });
    }
}

criterion_group!(name=benches;
                 config = Criterion::default().sample_size(30).measurement_time(Duration::from_secs(15)).with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
                 targets=pair_distance, distance_matrix, p_values);
criterion_main!(benches);
