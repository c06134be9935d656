//! Evolutionary search for small tile sets that self-assemble a pattern.
//!
//! # Overview
//!
//! - **Genome Operations** (`genome`): seeded random glue tables, seed
//!   boundaries and mutation
//! - **Fitness Functions** (`fitness`): pluggable scoring of grown assemblies
//! - **Search** (`search`): organisms and the elitist approximator
//! - **Run Recorder** (`archive`): JSON run logs on disk
//!
//! # Example
//!
//! ```rust,no_run
//! use pattycake::compute::evolution::PatsApproximator;
//! use pattycake::schema::{ApproximatorConfig, TargetPattern};
//!
//! let pattern: TargetPattern = "b w\nw b".parse().unwrap();
//! let mut engine = PatsApproximator::new(ApproximatorConfig::default(), pattern).unwrap();
//! let summary = engine.run_with_callback(100, |report, _population| {
//!     if let Some(event) = &report.new_best {
//!         println!("generation {}: {}", event.generation, event.score());
//!     }
//! });
//! println!("best {} of {}", summary.best_score, summary.perfect_score);
//! ```
//!
//! # Fitness Strategies
//!
//! - `PatternMatchFirst`: a tile's colour is fixed where it is first seen
//! - `PatternMatchBest`: a tile takes the colour it covers most often
//! - `PatternMatchFirstTileLimit`, `PatternMatchBestTileLimit`: either of the
//!   above, penalised past a tile budget
//! - `LineMatchFirst`: strict matching on the bottom row only

mod archive;
mod fitness;
mod genome;
mod search;

pub use archive::{PopulationEntry, PopulationSnapshot, RunRecorder, load_best};
pub use fitness::{
    Evaluation, FitnessFunction, LineMatchFirst, PatternMatchBest, PatternMatchFirst, TileLimited,
};
pub use genome::{GenomeRng, genome_distance};
pub use search::{Offspring, Organism, PatsApproximator};
