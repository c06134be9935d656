//! Target patterns: the two-colour images a tile set must reproduce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two pattern colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Both colours, in declaration order.
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    /// Dense index used for per-colour tallies.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// Single-character form used in renderings.
    pub fn symbol(self) -> char {
        match self {
            Color::Black => 'b',
            Color::White => 'w',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" | "b" => Ok(Color::Black),
            "white" | "w" => Ok(Color::White),
            _ => Err(s.to_string()),
        }
    }
}

/// Pattern validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("Pattern is empty")]
    Empty,
    #[error("Pattern length {len} is not a perfect square")]
    NotSquare { len: usize },
    #[error("Unknown colour token {token:?} at position {position}")]
    UnknownColor { token: String, position: usize },
}

/// A square target pattern, stored row-major as read (first row on top).
///
/// Grid rows are numbered bottom-up from the seed row, so interior cell
/// `(row, col)` with `1 <= row, col <= n` maps to pattern index
/// `(n - row) * n + (col - 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct TargetPattern {
    size: usize,
    colors: Vec<Color>,
}

impl TargetPattern {
    /// Build a pattern from row-major colours.
    pub fn new(colors: Vec<Color>) -> Result<Self, PatternError> {
        if colors.is_empty() {
            return Err(PatternError::Empty);
        }
        let size = integer_sqrt(colors.len());
        if size * size != colors.len() {
            return Err(PatternError::NotSquare { len: colors.len() });
        }
        Ok(Self { size, colors })
    }

    /// Parse colour tokens (e.g. the whitespace-split contents of a pattern file).
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let colors = tokens
            .into_iter()
            .enumerate()
            .map(|(position, token)| {
                token
                    .as_ref()
                    .parse::<Color>()
                    .map_err(|token| PatternError::UnknownColor { token, position })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Side length `n` of the pattern.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of positions (`n²`).
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed pattern.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Row-major colours.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Pattern index for an interior grid cell.
    #[inline]
    pub fn pattern_index(&self, row: usize, col: usize) -> usize {
        debug_assert!((1..=self.size).contains(&row) && (1..=self.size).contains(&col));
        (self.size - row) * self.size + (col - 1)
    }

    /// Target colour for an interior grid cell.
    #[inline]
    pub fn color_at(&self, row: usize, col: usize) -> Color {
        self.colors[self.pattern_index(row, col)]
    }

    /// Number of distinct colours used; the fewest tiles any solution can use.
    pub fn distinct_colors(&self) -> usize {
        Color::ALL
            .iter()
            .filter(|c| self.colors.contains(c))
            .count()
    }
}

impl TryFrom<Vec<Color>> for TargetPattern {
    type Error = PatternError;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<TargetPattern> for Vec<Color> {
    fn from(pattern: TargetPattern) -> Self {
        pattern.colors
    }
}

impl FromStr for TargetPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tokens(s.split_whitespace())
    }
}

impl fmt::Display for TargetPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.colors.chunks(self.size) {
            let line: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

fn integer_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}
