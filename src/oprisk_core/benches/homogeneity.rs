extern crate criterion;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oprisk_core::prelude::*;
use pprof::criterion::{Output, PProfProfiler};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn synthetic_losses() -> polars::prelude::DataFrame {
    let config = GenerationConfig::new(20, 500, (5.0, 7.0), (1.0, 2.0));
    generate_synthetic_data(&config, &mut StdRng::seed_from_u64(42)).unwrap()
}

pub fn grouping_strategies(c: &mut Criterion) {
    let mut grouping_group = c.benchmark_group("Grouping");
    let table = synthetic_losses();

    for (name, strategy) in [
        ("Raw", GroupingStrategy::Raw),
        (
            "BusinessRules",
            GroupingStrategy::BusinessRules {
                event_types: vec!["Fraud".into(), "Error".into()],
            },
        ),
        ("Clustering", GroupingStrategy::Clustering { n_clusters: 5 }),
        (
            "Combined",
            GroupingStrategy::Combined {
                event_types: vec!["Fraud".into()],
                n_clusters: 5,
            },
        ),
    ] {
        grouping_group.bench_with_input(BenchmarkId::new("Strategy", name), &strategy, |b, s| {
            b.iter(|| group(black_box(&table), s).unwrap())
        });
    }
}

pub fn assess(c: &mut Criterion) {
    let mut assess_group = c.benchmark_group("Homogeneity");
    let table = synthetic_losses();

    for n_clusters in [1, 5, 20] {
        let grouped = group(&table, &GroupingStrategy::Clustering { n_clusters }).unwrap();
        assess_group.bench_with_input(BenchmarkId::new("Groups", n_clusters), &grouped, |b, t| {
            b.iter(|| assess_homogeneity_detailed(black_box(t)).unwrap())
        });
    }
}

criterion_group!(name=benches;
                 config = Criterion::default().sample_size(30).measurement_time(Duration::from_secs(15)).with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
                 targets=grouping_strategies, assess);
criterion_main!(benches);
