//! Genome representation: a glue table plus a seed boundary.

use serde::{Deserialize, Serialize};

/// Edge label. `0` means "unset"; real labels live in `[1, max_glue]`.
pub type Glue = u32;

/// Size of the label alphabet for a pattern of side `n`: `2 n²`.
#[inline]
pub fn max_glue_for(pattern_size: usize) -> Glue {
    (pattern_size * pattern_size * 2) as Glue
}

/// A tile with four edge labels.
///
/// Equality and hashing are structural, so tiles can key tile-type maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub north: Glue,
    pub east: Glue,
    pub south: Glue,
    pub west: Glue,
}

impl Tile {
    pub fn new(north: Glue, east: Glue, south: Glue, west: Glue) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
    }
}

/// Output glues produced by a glue table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlueOutput {
    pub north: Glue,
    pub east: Glue,
}

impl From<(Glue, Glue)> for GlueOutput {
    fn from((north, east): (Glue, Glue)) -> Self {
        Self { north, east }
    }
}

/// Genome validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenomeError {
    #[error("Glue table has {actual} entries, expected {expected}")]
    TableSize { expected: usize, actual: usize },
    #[error("Seed boundary has {actual} labels, expected {expected}")]
    SeedLength { expected: usize, actual: usize },
    #[error("Glue label {label} outside [1, {max_glue}]")]
    LabelOutOfRange { label: Glue, max_glue: Glue },
    #[error("Genome alphabet {actual} does not match pattern alphabet {expected}")]
    AlphabetMismatch { expected: Glue, actual: Glue },
}

/// Rule set mapping an incoming (south, west) pair to outgoing (north, east).
///
/// Stored as one flat buffer of `(max_glue + 1)²` entries so copying a table
/// is a single contiguous clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGlueTable")]
pub struct GlueTable {
    max_glue: Glue,
    entries: Vec<GlueOutput>,
}

#[derive(Deserialize)]
struct RawGlueTable {
    max_glue: Glue,
    entries: Vec<GlueOutput>,
}

impl TryFrom<RawGlueTable> for GlueTable {
    type Error = GenomeError;

    fn try_from(raw: RawGlueTable) -> Result<Self, Self::Error> {
        Self::from_entries(raw.max_glue, raw.entries)
    }
}

impl GlueTable {
    /// Build a table from a generator called once per entry, in index order.
    pub fn from_fn<F>(max_glue: Glue, mut f: F) -> Self
    where
        F: FnMut(Glue, Glue) -> GlueOutput,
    {
        let stride = max_glue as usize + 1;
        let mut entries = Vec::with_capacity(stride * stride);
        for south in 0..=max_glue {
            for west in 0..=max_glue {
                entries.push(f(south, west));
            }
        }
        Self { max_glue, entries }
    }

    /// Build a table from raw entries, validating size and labels.
    pub fn from_entries(max_glue: Glue, entries: Vec<GlueOutput>) -> Result<Self, GenomeError> {
        let table = Self { max_glue, entries };
        table.validate()?;
        Ok(table)
    }

    /// Table where every lookup yields the same output.
    pub fn constant(max_glue: Glue, output: GlueOutput) -> Self {
        Self::from_fn(max_glue, |_, _| output)
    }

    #[inline]
    pub fn max_glue(&self) -> Glue {
        self.max_glue
    }

    /// Number of entries per axis (`max_glue + 1`).
    #[inline]
    pub fn stride(&self) -> usize {
        self.max_glue as usize + 1
    }

    #[inline]
    fn index(&self, south: Glue, west: Glue) -> usize {
        debug_assert!(south <= self.max_glue && west <= self.max_glue);
        south as usize * self.stride() + west as usize
    }

    /// Look up the (north, east) output for a (south, west) input.
    #[inline]
    pub fn lookup(&self, south: Glue, west: Glue) -> GlueOutput {
        self.entries[self.index(south, west)]
    }

    /// Overwrite one entry.
    pub fn set(&mut self, south: Glue, west: Glue, output: GlueOutput) {
        let idx = self.index(south, west);
        self.entries[idx] = output;
    }

    /// All entries in index order.
    pub fn entries(&self) -> &[GlueOutput] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [GlueOutput] {
        &mut self.entries
    }

    /// Check dimensions and that every label is within `[1, max_glue]`.
    pub fn validate(&self) -> Result<(), GenomeError> {
        let expected = self.stride() * self.stride();
        if self.entries.len() != expected {
            return Err(GenomeError::TableSize {
                expected,
                actual: self.entries.len(),
            });
        }
        for entry in &self.entries {
            check_label(entry.north, self.max_glue)?;
            check_label(entry.east, self.max_glue)?;
        }
        Ok(())
    }
}

/// Boundary labels the assembly grows from.
///
/// The first `n` labels are east glues of column 0, label `i` sitting at
/// row `n - i`. The remaining `n` are north glues of row 0, label `n + j`
/// sitting at column `j + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Glue>", into = "Vec<Glue>")]
pub struct SeedBoundary {
    labels: Vec<Glue>,
}

impl TryFrom<Vec<Glue>> for SeedBoundary {
    type Error = GenomeError;

    /// Labels must fit the alphabet implied by the boundary length.
    fn try_from(labels: Vec<Glue>) -> Result<Self, Self::Error> {
        let seed = Self::new(labels)?;
        seed.validate(max_glue_for(seed.pattern_size()))?;
        Ok(seed)
    }
}

impl From<SeedBoundary> for Vec<Glue> {
    fn from(seed: SeedBoundary) -> Self {
        seed.labels
    }
}

impl SeedBoundary {
    /// Wrap raw boundary labels. Length must be even.
    pub fn new(labels: Vec<Glue>) -> Result<Self, GenomeError> {
        if labels.is_empty() || labels.len() % 2 != 0 {
            return Err(GenomeError::SeedLength {
                expected: labels.len().div_ceil(2).max(1) * 2,
                actual: labels.len(),
            });
        }
        Ok(Self { labels })
    }

    pub(crate) fn from_raw(labels: Vec<Glue>) -> Self {
        debug_assert!(labels.len() % 2 == 0);
        Self { labels }
    }

    /// Build a boundary from its column-0 east glues (rows 1..=n, bottom to top)
    /// and row-0 north glues (columns 1..=n, left to right).
    pub fn from_edges(east_by_row: &[Glue], north_by_col: &[Glue]) -> Result<Self, GenomeError> {
        if east_by_row.len() != north_by_col.len() {
            return Err(GenomeError::SeedLength {
                expected: east_by_row.len() * 2,
                actual: east_by_row.len() + north_by_col.len(),
            });
        }
        let labels = east_by_row
            .iter()
            .rev()
            .chain(north_by_col.iter())
            .copied()
            .collect();
        Self::new(labels)
    }

    /// Pattern side length the boundary seeds.
    #[inline]
    pub fn pattern_size(&self) -> usize {
        self.labels.len() / 2
    }

    /// East glue of the column-0 cell at `row` (1-based).
    #[inline]
    pub fn east_at_row(&self, row: usize) -> Glue {
        self.labels[self.pattern_size() - row]
    }

    /// North glue of the row-0 cell at `col` (1-based).
    #[inline]
    pub fn north_at_col(&self, col: usize) -> Glue {
        self.labels[self.pattern_size() + col - 1]
    }

    pub fn labels(&self) -> &[Glue] {
        &self.labels
    }

    pub(crate) fn labels_mut(&mut self) -> &mut [Glue] {
        &mut self.labels
    }

    /// Check every label is within `[1, max_glue]`.
    pub fn validate(&self, max_glue: Glue) -> Result<(), GenomeError> {
        self.labels
            .iter()
            .try_for_each(|&label| check_label(label, max_glue))
    }
}

/// Everything evolution acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGenome")]
pub struct Genome {
    pub glue_table: GlueTable,
    pub seed: SeedBoundary,
}

#[derive(Deserialize)]
struct RawGenome {
    glue_table: GlueTable,
    seed: SeedBoundary,
}

impl TryFrom<RawGenome> for Genome {
    type Error = GenomeError;

    fn try_from(raw: RawGenome) -> Result<Self, Self::Error> {
        let genome = Self::new(raw.glue_table, raw.seed);
        genome.validate(genome.pattern_size())?;
        Ok(genome)
    }
}

impl Genome {
    pub fn new(glue_table: GlueTable, seed: SeedBoundary) -> Self {
        Self { glue_table, seed }
    }

    #[inline]
    pub fn pattern_size(&self) -> usize {
        self.seed.pattern_size()
    }

    /// Validate the genome for a pattern of side `pattern_size`.
    pub fn validate(&self, pattern_size: usize) -> Result<(), GenomeError> {
        let expected = max_glue_for(pattern_size);
        if self.glue_table.max_glue() != expected {
            return Err(GenomeError::AlphabetMismatch {
                expected,
                actual: self.glue_table.max_glue(),
            });
        }
        if self.seed.pattern_size() != pattern_size {
            return Err(GenomeError::SeedLength {
                expected: pattern_size * 2,
                actual: self.seed.labels().len(),
            });
        }
        self.glue_table.validate()?;
        self.seed.validate(expected)
    }
}

fn check_label(label: Glue, max_glue: Glue) -> Result<(), GenomeError> {
    if label == 0 || label > max_glue {
        Err(GenomeError::LabelOutOfRange { label, max_glue })
    } else {
        Ok(())
    }
}
