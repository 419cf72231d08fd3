//! Benchmarks for grid generation, lookup and adaptive refinement

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sparsegrids::{generator, GridStorage, HashRefinement, RefinementFunctor};

fn bench_regular_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("regular_generation");

    for (dim, level) in [(2, 6), (3, 5), (4, 4)] {
        group.bench_with_input(
            BenchmarkId::new("dim_level", format!("{}x{}", dim, level)),
            &(dim, level),
            |b, &(dim, level)| {
                b.iter(|| {
                    let mut storage = GridStorage::new(dim);
                    generator::regular(&mut storage, black_box(level)).unwrap();
                    storage.len()
                })
            },
        );
    }

    group.finish();
}

fn bench_point_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_lookup");

    for level in [4, 6, 8] {
        let mut storage = GridStorage::new(2);
        generator::regular(&mut storage, level).unwrap();
        let points: Vec<_> = storage.iter().map(|(_, p)| p.clone()).collect();

        group.bench_with_input(BenchmarkId::new("2D", level), &level, |b, _| {
            b.iter(|| {
                let mut hits = 0usize;
                for point in &points {
                    if storage.find(black_box(point)).is_some() {
                        hits += 1;
                    }
                }
                hits
            })
        });
    }

    group.finish();
}

fn bench_free_refine(c: &mut Criterion) {
    let mut group = c.benchmark_group("free_refine");

    for level in [3, 5] {
        group.bench_with_input(BenchmarkId::new("2D_budget_10", level), &level, |b, &level| {
            b.iter_batched(
                || {
                    let mut storage = GridStorage::new(2);
                    generator::regular(&mut storage, level).unwrap();
                    let alpha: Vec<f64> =
                        (0..storage.len()).map(|i| (i as f64 * 0.61).sin()).collect();
                    (storage, alpha)
                },
                |(mut storage, alpha)| {
                    let functor = RefinementFunctor::surplus(&alpha, 10, 0.0);
                    HashRefinement::new()
                        .free_refine(&mut storage, &functor)
                        .unwrap();
                    storage.len()
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_regular_generation,
    bench_point_lookup,
    bench_free_refine
);
criterion_main!(benches);
