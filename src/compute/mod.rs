//! Compute module - Tile assembly and evolutionary search.

mod assembly;

pub mod evolution;

pub use assembly::*;
