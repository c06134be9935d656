//! Genome manipulation utilities for evolutionary search.
//!
//! Provides random generation and mutation of glue tables and seed boundaries.

use rand::prelude::*;

use crate::schema::{Genome, Glue, GlueOutput, GlueTable, SeedBoundary, max_glue_for};

/// Random number generator wrapper for genome operations.
///
/// Every random draw made by a run goes through one of these, so a run is
/// reproducible from the seed it was created with.
pub struct GenomeRng {
    rng: StdRng,
    seed: u64,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create with a random seed (still recorded).
    pub fn random() -> Self {
        Self::new(rand::random())
    }

    /// Seed this generator was created from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform label in `[1, max_glue]`.
    #[inline]
    pub fn random_glue(&mut self, max_glue: Glue) -> Glue {
        self.rng.gen_range(1..=max_glue)
    }

    /// Glue table with every entry drawn uniformly from `[1, max_glue]`.
    pub fn random_glue_table(&mut self, max_glue: Glue) -> GlueTable {
        GlueTable::from_fn(max_glue, |_, _| GlueOutput {
            north: self.random_glue(max_glue),
            east: self.random_glue(max_glue),
        })
    }

    /// Seed boundary of `2 * pattern_size` uniform labels.
    pub fn random_seed_boundary(&mut self, pattern_size: usize) -> SeedBoundary {
        let max_glue = max_glue_for(pattern_size);
        let labels = (0..pattern_size * 2)
            .map(|_| self.random_glue(max_glue))
            .collect();
        SeedBoundary::from_raw(labels)
    }

    /// Generate a random genome for a pattern of side `pattern_size`.
    pub fn random_genome(&mut self, pattern_size: usize) -> Genome {
        let glue_table = self.random_glue_table(max_glue_for(pattern_size));
        let seed = self.random_seed_boundary(pattern_size);
        Genome::new(glue_table, seed)
    }

    /// Return a mutated copy of `genome`; the original is not touched.
    ///
    /// Each glue table entry redraws its north and east labels independently
    /// with probability `rate`, as does every seed boundary label.
    pub fn mutated(&mut self, genome: &Genome, rate: f64) -> Genome {
        let mut child = genome.clone();
        self.mutate(&mut child, rate);
        child
    }

    /// Mutate a genome in place.
    pub fn mutate(&mut self, genome: &mut Genome, rate: f64) {
        let max_glue = genome.glue_table.max_glue();

        for entry in genome.glue_table.entries_mut() {
            if self.rng.gen_bool(rate) {
                entry.north = self.random_glue(max_glue);
            }
            if self.rng.gen_bool(rate) {
                entry.east = self.random_glue(max_glue);
            }
        }

        for label in genome.seed.labels_mut() {
            if self.rng.gen_bool(rate) {
                *label = self.random_glue(max_glue);
            }
        }
    }

    /// Uniform index in `0..len`.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Number of labels that differ between two genomes of the same shape.
pub fn genome_distance(g1: &Genome, g2: &Genome) -> usize {
    let table = g1
        .glue_table
        .entries()
        .iter()
        .zip(g2.glue_table.entries())
        .map(|(a, b)| usize::from(a.north != b.north) + usize::from(a.east != b.east))
        .sum::<usize>();
    let seed = g1
        .seed
        .labels()
        .iter()
        .zip(g2.seed.labels())
        .filter(|(a, b)| a != b)
        .count();
    table + seed
}
