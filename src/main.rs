//! Pattycake CLI - Approximate a pattern's tile set from the command line.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;

use log::warn;
use pattycake::{
    compute::evolution::{PatsApproximator, RunRecorder},
    schema::{ApproximatorConfig, FitnessStrategy, NewBestEvent, TargetPattern},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let mut args: Vec<String> = std::env::args().collect();
    let fitness_arg = take_fitness_flag(&mut args).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    if args.len() < 2 {
        eprintln!(
            "Usage: {} [--fitness <1-5>] <pattern.txt> [config.json] [generations]",
            args[0]
        );
        eprintln!();
        eprintln!("Search for a small tile set that self-assembles a target pattern.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  pattern.txt  Square pattern of whitespace-separated b/w tokens");
        eprintln!("  config.json  Approximator configuration (default settings if omitted)");
        eprintln!("  generations  Override the configured number of generations");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --fitness N  Override the fitness strategy:");
        eprintln!("               1 pattern match first, 2 pattern match best,");
        eprintln!("               3 first with tile limit, 4 best with tile limit,");
        eprintln!("               5 line match first");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let pattern_path = PathBuf::from(&args[1]);
    let mut rest = args[2..].iter();

    let mut config = ApproximatorConfig::default();
    let mut generations_arg = None;
    if let Some(arg) = rest.next() {
        match arg.parse::<usize>() {
            Ok(generations) => generations_arg = Some(generations),
            Err(_) => config = load_config(arg),
        }
    }
    if let Some(arg) = rest.next() {
        let generations = arg.parse::<usize>().unwrap_or_else(|e| {
            eprintln!("Invalid generation count '{}': {}", arg, e);
            std::process::exit(1);
        });
        generations_arg = Some(generations);
    }
    if let Some(generations) = generations_arg {
        config.generations = generations;
    }
    if let Some(fitness) = fitness_arg {
        config.fitness = fitness;
    }

    // Load pattern
    let pattern_str = fs::read_to_string(&pattern_path).unwrap_or_else(|e| {
        eprintln!("Error reading pattern file: {}", e);
        std::process::exit(1);
    });
    let pattern: TargetPattern = pattern_str.parse().unwrap_or_else(|e| {
        eprintln!("Error parsing pattern: {}", e);
        std::process::exit(1);
    });

    let generations = config.generations;
    let snapshot_interval = config.snapshot_interval;
    let output_dir = config.output_dir.clone();

    let mut engine = PatsApproximator::new(config, pattern).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    println!("Pattycake Tile Set Search");
    println!("=========================");
    println!("Run: {}", engine.run_id());
    println!("Seed: {}", engine.random_seed());
    println!(
        "Pattern: {}x{} ({} colours)",
        engine.pattern().size(),
        engine.pattern().size(),
        engine.pattern().distinct_colors()
    );
    println!(
        "Population: {} (elite {})",
        engine.config().population_size,
        engine.elite_count()
    );
    println!("Fitness: {}", engine.run_info().fitness);
    println!("Generations: {}", generations);
    println!();

    let recorder = output_dir.map(|dir| {
        RunRecorder::new(&dir, &engine.run_info()).unwrap_or_else(|e| {
            eprintln!("Error creating run directory in {}: {}", dir, e);
            std::process::exit(1);
        })
    });

    let initial = NewBestEvent {
        generation: 0,
        previous_best: i64::MIN,
        candidate: engine.best().to_snapshot(),
    };
    report_new_best(&initial, recorder.as_ref());
    if let Some(recorder) = &recorder
        && snapshot_interval > 0
        && let Err(e) = recorder.record_population(0, engine.population())
    {
        warn!("failed to record population: {}", e);
    }

    let summary = engine.run_with_callback(generations, |report, population| {
        if let Some(event) = &report.new_best {
            report_new_best(event, recorder.as_ref());
        }
        if let Some(recorder) = &recorder
            && snapshot_interval > 0
            && report.generation % snapshot_interval == 0
            && let Err(e) = recorder.record_population(report.generation, population)
        {
            warn!("failed to record population: {}", e);
        }
    });

    if let Some(recorder) = &recorder {
        match recorder.record_summary(&summary) {
            Ok(path) => println!("Run log: {}", path.display()),
            Err(e) => warn!("failed to record summary: {}", e),
        }
    }

    println!();
    println!(
        "Best score: {} / {} ({} mismatches, {} tiles)",
        summary.best_score,
        summary.perfect_score,
        summary.best.mismatches,
        summary.best.distinct_tiles
    );
    println!(
        "Time: {:.2}s ({} evaluations, {:.1} generations/s)",
        summary.elapsed_seconds,
        summary.total_evaluations,
        summary.generations as f64 / summary.elapsed_seconds.max(f64::EPSILON)
    );
}

/// Remove `--fitness <code>` from `args`, returning the strategy it names.
fn take_fitness_flag(args: &mut Vec<String>) -> Result<Option<FitnessStrategy>, String> {
    let Some(pos) = args.iter().position(|a| a == "--fitness") else {
        return Ok(None);
    };
    let code = args
        .get(pos + 1)
        .ok_or_else(|| "--fitness requires a strategy code (1-5)".to_string())?;
    let strategy = code
        .parse::<u32>()
        .ok()
        .and_then(FitnessStrategy::from_code)
        .ok_or_else(|| format!("Unknown fitness strategy code '{}', expected 1-5", code))?;
    args.drain(pos..=pos + 1);
    Ok(Some(strategy))
}

fn load_config(path: &str) -> ApproximatorConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });
    serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    })
}

fn report_new_best(event: &NewBestEvent, recorder: Option<&RunRecorder>) {
    let candidate = &event.candidate;
    println!(
        "Generation {}: score {} / {} ({} mismatches, {} tiles)",
        event.generation,
        candidate.score,
        candidate.perfect_score,
        candidate.mismatches,
        candidate.distinct_tiles
    );
    println!("{}", candidate.assembly);

    if let Some(recorder) = recorder
        && let Err(e) = recorder.record_new_best(event)
    {
        warn!("failed to record new best: {}", e);
    }
}

fn print_example_config() {
    let config = ApproximatorConfig {
        random_seed: Some(42),
        output_dir: Some("runs".to_string()),
        ..Default::default()
    };

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
    println!();
    println!("Example pattern (pattern.txt):");
    println!("b w b w\nw b w b\nb w b w\nw b w b");
}
