//! Configuration for an approximation run.

use serde::{Deserialize, Serialize};

use super::{FitnessStrategy, PatternError};

/// Top-level configuration for the evolutionary approximator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproximatorConfig {
    /// Number of organisms per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Generations to run when driven by the CLI.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Per-label redraw probability (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Fraction of the sorted population carried over unchanged.
    #[serde(default = "default_elite_fraction")]
    pub elite_fraction: f64,
    /// Fitness function.
    #[serde(default)]
    pub fitness: FitnessStrategy,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Log progress every N generations (0 disables).
    #[serde(default = "default_report_interval")]
    pub report_interval: usize,
    /// Write a population snapshot every N generations (0 disables).
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: usize,
    /// Directory for run logs. `None` disables recording.
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl Default for ApproximatorConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generations: default_generations(),
            mutation_rate: default_mutation_rate(),
            elite_fraction: default_elite_fraction(),
            fitness: FitnessStrategy::default(),
            random_seed: None,
            report_interval: default_report_interval(),
            snapshot_interval: default_snapshot_interval(),
            output_dir: None,
        }
    }
}

fn default_population_size() -> usize {
    200
}
fn default_generations() -> usize {
    2_000
}
fn default_mutation_rate() -> f64 {
    0.01
}
fn default_elite_fraction() -> f64 {
    0.1
}
fn default_report_interval() -> usize {
    100
}
fn default_snapshot_interval() -> usize {
    10
}

impl ApproximatorConfig {
    /// Number of organisms kept unchanged each generation.
    #[inline]
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_fraction).floor() as usize
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if !(self.elite_fraction > 0.0 && self.elite_fraction <= 1.0) {
            return Err(ConfigError::InvalidEliteFraction(self.elite_fraction));
        }
        if self.elite_count() == 0 {
            return Err(ConfigError::EmptyElite {
                population_size: self.population_size,
                elite_fraction: self.elite_fraction,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be non-zero")]
    EmptyPopulation,
    #[error(
        "Population size {population_size} with elite fraction {elite_fraction} leaves no elite"
    )]
    EmptyElite {
        population_size: usize,
        elite_fraction: f64,
    },
    #[error("Mutation rate {0} must be within [0, 1]")]
    InvalidMutationRate(f64),
    #[error("Elite fraction {0} must be within (0, 1]")]
    InvalidEliteFraction(f64),
    #[error("Invalid target pattern: {0}")]
    Pattern(#[from] PatternError),
    #[error("Invalid genome: {0}")]
    Genome(#[from] super::GenomeError),
}
