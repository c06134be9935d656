//! Quick evolution performance test

use pattycake::{ApproximatorConfig, PatsApproximator, TargetPattern};
use std::time::Instant;

fn checkerboard(n: usize) -> TargetPattern {
    let tokens: Vec<&str> = (0..n * n)
        .map(|i| if (i / n + i % n) % 2 == 0 { "b" } else { "w" })
        .collect();
    TargetPattern::from_tokens(tokens).expect("checkerboard is square")
}

fn run(
    config: ApproximatorConfig,
    pattern: TargetPattern,
    generations: usize,
) -> (f64, u64, i64, i64) {
    let start = Instant::now();
    let mut engine = PatsApproximator::new(config, pattern).expect("valid configuration");
    let summary = engine.run(generations);
    (
        start.elapsed().as_secs_f64(),
        summary.total_evaluations,
        summary.best_score,
        summary.perfect_score,
    )
}

fn main() {
    println!("=== Evolution Performance Test ===\n");

    // Test different pattern sizes
    for n in [4, 8, 16] {
        println!("Pattern size: {}x{}", n, n);

        let config = ApproximatorConfig {
            population_size: 100,
            random_seed: Some(42),
            ..Default::default()
        };
        let (elapsed, evals, best, perfect) = run(config, checkerboard(n), 50);

        println!("  Evaluations:    {}", evals);
        println!("  Elapsed:        {:.2}s", elapsed);
        println!("  Evals/sec:      {:.1}", evals as f64 / elapsed);
        println!("  Best score:     {} / {}", best, perfect);
        println!();
    }

    println!("=== Scalability Test (fixed 8x8 pattern) ===\n");

    // Test different population sizes
    for population_size in [50, 100, 200, 400] {
        let config = ApproximatorConfig {
            population_size,
            random_seed: Some(42),
            ..Default::default()
        };
        let (elapsed, evals, _, _) = run(config, checkerboard(8), 20);

        println!(
            "Population {}: {} evals in {:.2}s ({:.1} evals/sec)",
            population_size,
            evals,
            elapsed,
            evals as f64 / elapsed
        );
    }
}
