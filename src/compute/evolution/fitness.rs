//! Fitness function implementations for evolutionary tile set search.
//!
//! Every strategy starts from a perfect score and subtracts one point per
//! colour mismatch and one point per distinct tile type, so a consistent
//! assembly using few tile types scores highest.

use std::collections::HashMap;

use crate::compute::Assembly;
use crate::schema::{Color, FitnessStrategy, TargetPattern, Tile, TileAssignment};

/// Scores an assembly against a target pattern.
pub trait FitnessFunction: Send + Sync {
    /// Short identifier used in logs and run records.
    fn name(&self) -> &'static str;

    /// Upper bound of the score for `pattern`.
    fn perfect_score(&self, pattern: &TargetPattern) -> i64;

    /// Score a grown assembly.
    fn evaluate(&self, assembly: &Assembly, pattern: &TargetPattern) -> Evaluation;
}

/// Result of scoring one assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub score: i64,
    pub perfect_score: i64,
    pub mismatches: usize,
    pub distinct_tiles: usize,
    /// Tile types in order of first sighting, with the colour each represents.
    pub assignment: Vec<TileAssignment>,
}

impl Evaluation {
    fn from_matching(perfect_score: i64, matching: Matching) -> Self {
        let distinct_tiles = matching.assignment.len();
        let score = perfect_score - matching.mismatches as i64 - distinct_tiles as i64;
        Self {
            score,
            perfect_score,
            mismatches: matching.mismatches,
            distinct_tiles,
            assignment: matching.assignment,
        }
    }
}

/// Tile-to-colour matching before it is turned into a score.
#[derive(Debug, Default)]
struct Matching {
    mismatches: usize,
    assignment: Vec<TileAssignment>,
}

/// A tile's colour is fixed the first time it is seen.
fn match_first<I>(cells: I) -> Matching
where
    I: IntoIterator<Item = (Tile, Color)>,
{
    let mut seen: HashMap<Tile, usize> = HashMap::new();
    let mut matching = Matching::default();

    for (tile, color) in cells {
        match seen.get(&tile) {
            Some(&idx) => {
                let entry = &mut matching.assignment[idx];
                entry.occurrences += 1;
                if entry.color != color {
                    matching.mismatches += 1;
                }
            }
            None => {
                seen.insert(tile, matching.assignment.len());
                matching.assignment.push(TileAssignment {
                    tile,
                    color,
                    occurrences: 1,
                });
            }
        }
    }

    matching
}

/// A tile takes whichever colour it is seen with most; ties keep the first.
fn match_majority<I>(cells: I) -> Matching
where
    I: IntoIterator<Item = (Tile, Color)>,
{
    let mut seen: HashMap<Tile, usize> = HashMap::new();
    // (tile, first colour, per-colour tally)
    let mut tallies: Vec<(Tile, Color, [usize; 2])> = Vec::new();

    for (tile, color) in cells {
        let idx = *seen.entry(tile).or_insert_with(|| {
            tallies.push((tile, color, [0; 2]));
            tallies.len() - 1
        });
        tallies[idx].2[color.index()] += 1;
    }

    let mut matching = Matching::default();
    for (tile, first, counts) in tallies {
        let total: usize = counts.iter().sum();
        let color = Color::ALL.into_iter().fold(first, |best, c| {
            if counts[c.index()] > counts[best.index()] {
                c
            } else {
                best
            }
        });
        matching.mismatches += total - counts[color.index()];
        matching.assignment.push(TileAssignment {
            tile,
            color,
            occurrences: total,
        });
    }

    matching
}

fn pattern_cells<'a>(
    assembly: &'a Assembly,
    pattern: &'a TargetPattern,
) -> impl Iterator<Item = (Tile, Color)> + 'a {
    assembly
        .interior()
        .map(move |(row, col, tile)| (tile, pattern.color_at(row, col)))
}

fn pattern_perfect_score(pattern: &TargetPattern) -> i64 {
    2 * pattern.len() as i64
}

/// Strict pattern match: first sighting decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatchFirst;

impl FitnessFunction for PatternMatchFirst {
    fn name(&self) -> &'static str {
        "pattern_match_first"
    }

    fn perfect_score(&self, pattern: &TargetPattern) -> i64 {
        pattern_perfect_score(pattern)
    }

    fn evaluate(&self, assembly: &Assembly, pattern: &TargetPattern) -> Evaluation {
        let matching = match_first(pattern_cells(assembly, pattern));
        Evaluation::from_matching(self.perfect_score(pattern), matching)
    }
}

/// Majority-vote pattern match: less sensitive to growth order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatchBest;

impl FitnessFunction for PatternMatchBest {
    fn name(&self) -> &'static str {
        "pattern_match_best"
    }

    fn perfect_score(&self, pattern: &TargetPattern) -> i64 {
        pattern_perfect_score(pattern)
    }

    fn evaluate(&self, assembly: &Assembly, pattern: &TargetPattern) -> Evaluation {
        let matching = match_majority(pattern_cells(assembly, pattern));
        Evaluation::from_matching(self.perfect_score(pattern), matching)
    }
}

/// Wraps another strategy and charges one more point per tile over budget.
#[derive(Debug, Clone, Copy)]
pub struct TileLimited<F> {
    inner: F,
    tile_limit: Option<usize>,
    name: &'static str,
}

impl<F: FitnessFunction> TileLimited<F> {
    /// `None` budgets as many tiles as the pattern has colours.
    pub fn new(inner: F, tile_limit: Option<usize>, name: &'static str) -> Self {
        Self {
            inner,
            tile_limit,
            name,
        }
    }

    fn limit_for(&self, pattern: &TargetPattern) -> usize {
        self.tile_limit.unwrap_or_else(|| pattern.distinct_colors())
    }
}

impl<F: FitnessFunction> FitnessFunction for TileLimited<F> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn perfect_score(&self, pattern: &TargetPattern) -> i64 {
        self.inner.perfect_score(pattern)
    }

    fn evaluate(&self, assembly: &Assembly, pattern: &TargetPattern) -> Evaluation {
        let mut eval = self.inner.evaluate(assembly, pattern);
        let excess = eval.distinct_tiles.saturating_sub(self.limit_for(pattern));
        eval.score -= excess as i64;
        eval
    }
}

/// Strict match over the first grown row only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineMatchFirst;

impl FitnessFunction for LineMatchFirst {
    fn name(&self) -> &'static str {
        "line_match_first"
    }

    fn perfect_score(&self, pattern: &TargetPattern) -> i64 {
        2 * pattern.size() as i64
    }

    fn evaluate(&self, assembly: &Assembly, pattern: &TargetPattern) -> Evaluation {
        let cells = assembly
            .row(1)
            .map(|(col, tile)| (tile, pattern.color_at(1, col)));
        let matching = match_first(cells);
        Evaluation::from_matching(self.perfect_score(pattern), matching)
    }
}

impl FitnessStrategy {
    /// Instantiate the fitness function this strategy names.
    pub fn build(&self) -> Box<dyn FitnessFunction> {
        match self {
            FitnessStrategy::PatternMatchFirst => Box::new(PatternMatchFirst),
            FitnessStrategy::PatternMatchBest => Box::new(PatternMatchBest),
            FitnessStrategy::PatternMatchFirstTileLimit { tile_limit } => Box::new(
                TileLimited::new(PatternMatchFirst, *tile_limit, "pattern_match_first_tile_limit"),
            ),
            FitnessStrategy::PatternMatchBestTileLimit { tile_limit } => Box::new(
                TileLimited::new(PatternMatchBest, *tile_limit, "pattern_match_best_tile_limit"),
            ),
            FitnessStrategy::LineMatchFirst => Box::new(LineMatchFirst),
        }
    }
}
