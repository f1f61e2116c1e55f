//! Grid coordinates and neighborhood boxes on the lattice.

use serde::{Deserialize, Serialize};

/// A node position on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Row index, in `[0, H)`.
    pub row: usize,
    /// Column index, in `[0, W)`.
    pub col: usize,
}

impl GridPos {
    /// Creates a new position.
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev distance on the grid (no wrapping).
    #[inline]
    pub fn chebyshev(&self, other: &GridPos) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Returns true if `other` is one of the 8 cells surrounding this one.
    #[inline]
    pub fn is_adjacent(&self, other: &GridPos) -> bool {
        self.chebyshev(other) == 1
    }
}

/// Result of a best-matching-unit search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bmu {
    /// Winning node.
    pub pos: GridPos,
    /// Minimized distance under the active metric.
    pub distance: f64,
}

/// Inclusive rectangle of nodes around a BMU, clamped to the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    /// First row in the box.
    pub min_row: usize,
    /// Last row in the box.
    pub max_row: usize,
    /// First column in the box.
    pub min_col: usize,
    /// Last column in the box.
    pub max_col: usize,
}

impl Neighborhood {
    /// Integer half-width of the box for a (possibly fractional) radius.
    ///
    /// Rounds half away from zero and never goes below 0.
    #[inline]
    pub fn half_width(radius: f64) -> usize {
        radius.round().max(0.0) as usize
    }

    /// Builds the box of half-width `half_width` around `center` on a `rows x cols` lattice.
    pub fn around(center: GridPos, half_width: usize, rows: usize, cols: usize) -> Self {
        Self {
            min_row: center.row.saturating_sub(half_width),
            max_row: center.row.saturating_add(half_width).min(rows - 1),
            min_col: center.col.saturating_sub(half_width),
            max_col: center.col.saturating_add(half_width).min(cols - 1),
        }
    }

    /// Returns true if `pos` lies inside the box.
    #[inline]
    pub fn contains(&self, pos: GridPos) -> bool {
        (self.min_row..=self.max_row).contains(&pos.row)
            && (self.min_col..=self.max_col).contains(&pos.col)
    }

    /// Number of nodes in the box.
    #[inline]
    pub fn len(&self) -> usize {
        (self.max_row - self.min_row + 1) * (self.max_col - self.min_col + 1)
    }

    /// A box always holds at least its center.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates positions in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = GridPos> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| GridPos::new(row, col)))
    }
}
