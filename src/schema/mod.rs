//! Schema module - Patterns, genomes, configuration and reporting types.

mod config;
mod evolution;
mod genome;
mod pattern;

pub use config::*;
pub use evolution::*;
pub use genome::*;
pub use pattern::*;
