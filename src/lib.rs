//! Pattycake - Evolutionary approximation of pattern self-assembly tile sets.
//!
//! Given a black and white target pattern, search for a small set of square
//! tiles whose deterministic growth from a seed boundary reproduces it.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Patterns, genomes (glue tables and seeds), configuration and
//!   run records
//! - `compute`: Assembly growth, fitness, mutation and the evolutionary engine
//!
//! # Example
//!
//! ```rust,no_run
//! use pattycake::{ApproximatorConfig, PatsApproximator, TargetPattern};
//!
//! let pattern: TargetPattern = "b w b\nw b w\nb w b".parse().unwrap();
//! let config = ApproximatorConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = PatsApproximator::new(config, pattern).unwrap();
//! let summary = engine.run(500);
//!
//! println!("Best score {} / {}", summary.best_score, summary.perfect_score);
//! println!("{}", summary.best.assembly);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::Assembly;
pub use compute::evolution::{Organism, PatsApproximator, RunRecorder};
pub use schema::{ApproximatorConfig, FitnessStrategy, Genome, TargetPattern};
