//! Deterministic assembly of a tile grid from a seed boundary.
//!
//! The grid is `(n + 1) x (n + 1)`. Row 0 and column 0 hold the seed
//! boundary; every interior cell takes its south glue from the cell below
//! and its west glue from the cell to its left, then asks the glue table
//! for its own north and east glues.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{GlueTable, SeedBoundary, Tile};

/// Square grid of tiles, stored row-major with row 0 at the bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    size: usize,
    tiles: Vec<Tile>,
}

impl Assembly {
    /// Create a seeded, ungrown assembly.
    pub fn from_seed(seed: &SeedBoundary) -> Self {
        let n = seed.pattern_size();
        let size = n + 1;
        let mut assembly = Self {
            size,
            tiles: vec![Tile::default(); size * size],
        };

        for row in 1..size {
            assembly.update_at(
                row,
                0,
                Tile {
                    east: seed.east_at_row(row),
                    ..Tile::default()
                },
            );
        }
        for col in 1..size {
            assembly.update_at(
                0,
                col,
                Tile {
                    north: seed.north_at_col(col),
                    ..Tile::default()
                },
            );
        }

        assembly
    }

    /// Seed and grow in one step.
    pub fn assemble(seed: &SeedBoundary, glue_table: &GlueTable) -> Self {
        Self::from_seed(seed).grow(glue_table)
    }

    /// Grow every interior cell, returning a new assembly.
    ///
    /// The receiver (and so its boundary) is left untouched. Cells already
    /// grown are overwritten, so regrowing is idempotent.
    pub fn grow(&self, glue_table: &GlueTable) -> Self {
        let mut result = self.clone();
        result.grow_in_place(glue_table);
        result
    }

    fn grow_in_place(&mut self, glue_table: &GlueTable) {
        for row in 1..self.size {
            for col in 1..self.size {
                let south = self.tile_at(row - 1, col).north;
                let west = self.tile_at(row, col - 1).east;
                let out = glue_table.lookup(south, west);
                self.update_at(row, col, Tile::new(out.north, out.east, south, west));
            }
        }
    }

    /// Side length including the boundary (`n + 1`).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Side length of the interior (`n`).
    #[inline]
    pub fn pattern_size(&self) -> usize {
        self.size - 1
    }

    #[inline]
    pub fn tile_at(&self, row: usize, col: usize) -> Tile {
        self.tiles[row * self.size + col]
    }

    #[inline]
    fn update_at(&mut self, row: usize, col: usize, tile: Tile) {
        self.tiles[row * self.size + col] = tile;
    }

    /// Interior cells as `(row, col, tile)`, row-major from the bottom.
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        (1..self.size).flat_map(move |row| {
            (1..self.size).map(move |col| (row, col, self.tile_at(row, col)))
        })
    }

    /// Interior cells of a single row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, Tile)> + '_ {
        (1..self.size).map(move |col| (col, self.tile_at(row, col)))
    }

    /// All tiles including the boundary.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

impl fmt::Display for Assembly {
    /// Render as a box per tile, top row first:
    ///
    /// ```text
    /// |   N   |
    /// | W   E |
    /// |   S   |
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!("-{}", "-------".repeat(self.size));
        writeln!(f, "{separator}")?;

        for row in (0..self.size).rev() {
            let mut north = String::from("|");
            let mut middle = String::from("|");
            let mut south = String::from("|");
            for col in 0..self.size {
                let tile = self.tile_at(row, col);
                north.push_str(&format!("  {:^3} |", tile.north));
                middle.push_str(&format!("{:^3}{:^3}|", tile.west, tile.east));
                south.push_str(&format!("  {:^3} |", tile.south));
            }
            writeln!(f, "{north}")?;
            writeln!(f, "{middle}")?;
            writeln!(f, "{south}")?;
            writeln!(f, "{separator}")?;
        }

        Ok(())
    }
}
