//! Evolution types: fitness strategy selection and run reporting.
//!
//! Everything here is serializable so the run recorder (or any external
//! consumer) can persist new-best events, generation statistics and
//! run identity without reaching into the engine.

use serde::{Deserialize, Serialize};

use super::{ApproximatorConfig, Color, Genome, TargetPattern, Tile};
use crate::compute::Assembly;

/// Fitness function used to score assemblies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum FitnessStrategy {
    /// First sighting fixes a tile's colour; later disagreements are mismatches.
    #[default]
    PatternMatchFirst,
    /// Each tile takes its majority colour; minority sightings are mismatches.
    PatternMatchBest,
    /// `PatternMatchFirst` with an extra penalty per tile over the budget.
    PatternMatchFirstTileLimit {
        /// Tile budget. `None` uses the pattern's colour count.
        #[serde(default)]
        tile_limit: Option<usize>,
    },
    /// `PatternMatchBest` with an extra penalty per tile over the budget.
    PatternMatchBestTileLimit {
        #[serde(default)]
        tile_limit: Option<usize>,
    },
    /// Strict matching of the first grown row only. Debugging aid.
    LineMatchFirst,
}

impl FitnessStrategy {
    /// Strategy for the numeric codes accepted by the CLI `--fitness` flag (1-5).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::PatternMatchFirst),
            2 => Some(Self::PatternMatchBest),
            3 => Some(Self::PatternMatchFirstTileLimit { tile_limit: None }),
            4 => Some(Self::PatternMatchBestTileLimit { tile_limit: None }),
            5 => Some(Self::LineMatchFirst),
            _ => None,
        }
    }
}

/// A tile type and the colour it was assigned while scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileAssignment {
    pub tile: Tile,
    pub color: Color,
    /// Times the tile appeared in the scored region.
    pub occurrences: usize,
}

/// Serializable view of one organism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    pub id: u64,
    /// Generation the organism was created in.
    pub generation: usize,
    pub parent: Option<u64>,
    pub score: i64,
    pub perfect_score: i64,
    pub mismatches: usize,
    pub distinct_tiles: usize,
    pub genome: Genome,
    pub assembly: Assembly,
    pub assignment: Vec<TileAssignment>,
}

/// Emitted when a generation's best score beats every earlier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBestEvent {
    pub generation: usize,
    pub previous_best: i64,
    pub candidate: CandidateSnapshot,
}

impl NewBestEvent {
    #[inline]
    pub fn score(&self) -> i64 {
        self.candidate.score
    }
}

/// Per-generation statistics returned by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: usize,
    /// Best score seen over the whole run.
    pub best_score: i64,
    /// Best score in this generation.
    pub generation_best: i64,
    pub avg_score: f64,
    pub perfect_score: i64,
    /// Distinct tiles used by this generation's leader.
    pub best_distinct_tiles: usize,
    pub new_best: Option<NewBestEvent>,
}

/// Statistics history for plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvolutionHistory {
    pub best_score: Vec<i64>,
    pub generation_best: Vec<i64>,
    pub avg_score: Vec<f64>,
    pub best_distinct_tiles: Vec<usize>,
}

impl EvolutionHistory {
    pub fn record(&mut self, report: &GenerationReport) {
        self.best_score.push(report.best_score);
        self.generation_best.push(report.generation_best);
        self.avg_score.push(report.avg_score);
        self.best_distinct_tiles.push(report.best_distinct_tiles);
    }

    pub fn len(&self) -> usize {
        self.best_score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_score.is_empty()
    }
}

/// Identity of a run, recorded once so it can be reproduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    pub random_seed: u64,
    pub fitness: String,
    pub config: ApproximatorConfig,
    pub pattern: TargetPattern,
}

/// Result of a driven run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub random_seed: u64,
    pub generations: usize,
    pub total_evaluations: u64,
    pub best_score: i64,
    pub perfect_score: i64,
    pub elapsed_seconds: f64,
    pub best: CandidateSnapshot,
    pub history: EvolutionHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_codes() {
        assert_eq!(
            FitnessStrategy::from_code(1),
            Some(FitnessStrategy::PatternMatchFirst)
        );
        assert_eq!(
            FitnessStrategy::from_code(4),
            Some(FitnessStrategy::PatternMatchBestTileLimit { tile_limit: None })
        );
        assert_eq!(FitnessStrategy::from_code(0), None);
        assert_eq!(FitnessStrategy::from_code(6), None);
    }

    #[test]
    fn test_strategy_serialization() {
        let strategy = FitnessStrategy::PatternMatchFirstTileLimit {
            tile_limit: Some(3),
        };
        let json = serde_json::to_string(&strategy).unwrap();
        assert_eq!(json, r#"{"type":"PatternMatchFirstTileLimit","tile_limit":3}"#);

        let parsed: FitnessStrategy =
            serde_json::from_str(r#"{"type":"PatternMatchBestTileLimit"}"#).unwrap();
        assert_eq!(
            parsed,
            FitnessStrategy::PatternMatchBestTileLimit { tile_limit: None }
        );
    }
}
