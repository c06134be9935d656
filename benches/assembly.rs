//! Benchmarks for assembly growth, scoring and generations.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use pattycake::{
    ApproximatorConfig, Assembly, FitnessStrategy, PatsApproximator, TargetPattern,
    compute::evolution::{FitnessFunction, GenomeRng},
};

fn checkerboard(n: usize) -> TargetPattern {
    let tokens: Vec<&str> = (0..n * n)
        .map(|i| if (i / n + i % n) % 2 == 0 { "b" } else { "w" })
        .collect();
    TargetPattern::from_tokens(tokens).unwrap()
}

fn bench_grow(c: &mut Criterion) {
    let mut group = c.benchmark_group("grow");

    for n in [4, 8, 16, 32] {
        let genome = GenomeRng::new(42).random_genome(n);
        let seeded = Assembly::from_seed(&genome.seed);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", n, n)),
            &n,
            |b, _| {
                b.iter(|| black_box(seeded.grow(black_box(&genome.glue_table))));
            },
        );
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for strategy in [FitnessStrategy::PatternMatchFirst, FitnessStrategy::PatternMatchBest] {
        let fitness = strategy.build();
        let pattern = checkerboard(16);
        let genome = GenomeRng::new(42).random_genome(16);
        let assembly = Assembly::assemble(&genome.seed, &genome.glue_table);

        group.bench_with_input(
            BenchmarkId::from_parameter(fitness.name()),
            &pattern,
            |b, pattern| {
                b.iter(|| black_box(fitness.evaluate(black_box(&assembly), pattern)));
            },
        );
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    group.sample_size(20);

    for population_size in [50, 200] {
        let config = ApproximatorConfig {
            population_size,
            random_seed: Some(42),
            ..Default::default()
        };
        let mut engine = PatsApproximator::new(config, checkerboard(8)).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("pop_{}", population_size)),
            &population_size,
            |b, _| {
                b.iter(|| black_box(engine.run_generation()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_grow, bench_evaluate, bench_generation);
criterion_main!(benches);
