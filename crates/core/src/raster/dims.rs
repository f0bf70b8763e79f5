//! Grid dimensions and linear index arithmetic

use crate::error::{Error, Result};
use crate::raster::Neighbors;

/// Immutable `(rows, cols)` description of a row-major grid.
///
/// Every algorithm receives the dimensions explicitly through this type.
/// Cells are addressed by the linear index `i = row * cols + col`.
///
/// # Example
///
/// ```
/// use topohydro_core::GridDims;
///
/// let dims = GridDims::new(3, 4).unwrap();
/// assert_eq!(dims.len(), 12);
/// assert_eq!(dims.index(1, 2), 6);
/// assert!(dims.is_boundary(4));
/// assert!(!dims.is_boundary(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    rows: usize,
    cols: usize,
}

impl GridDims {
    /// Validate and create grid dimensions. Both sides must be at least 1.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::invalid_grid(rows, cols, 0, "dimensions must be positive"));
        }
        if rows.checked_mul(cols).is_none() {
            return Err(Error::invalid_grid(rows, cols, usize::MAX, "cell count overflows usize"));
        }
        Ok(Self { rows, cols })
    }

    /// Validate dimensions against the length of a flat buffer.
    pub fn for_buffer(len: usize, rows: usize, cols: usize) -> Result<Self> {
        let dims = Self::new(rows, cols)?;
        if dims.len() != len {
            return Err(Error::invalid_grid(
                rows,
                cols,
                len,
                "buffer length does not match rows * cols",
            ));
        }
        Ok(dims)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always false: a valid grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Linear index of (row, col). Does not check bounds.
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Linear index of (row, col), rejecting out-of-range coordinates.
    pub fn checked_index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.index(row, col))
    }

    /// (row, col) of a linear index
    pub fn coords(&self, i: usize) -> (usize, usize) {
        (i / self.cols, i % self.cols)
    }

    /// Whether `i` addresses a cell of this grid
    pub fn contains(&self, i: usize) -> bool {
        i < self.len()
    }

    /// True iff `i` lies on the outer ring (row 0, last row, col 0 or last col).
    pub fn is_boundary(&self, i: usize) -> bool {
        let (row, col) = self.coords(i);
        row == 0 || col == 0 || row + 1 == self.rows || col + 1 == self.cols
    }

    /// Outer-ring cells in ascending index order, each exactly once.
    pub fn boundary_indices(&self) -> impl Iterator<Item = usize> + Clone {
        let (rows, cols) = (self.rows, self.cols);
        (0..rows).flat_map(move |row| {
            let full_row = row == 0 || row + 1 == rows;
            // Interior rows contribute only their first and last column.
            let step = if full_row { 1 } else { (cols - 1).max(1) };
            (0..cols).step_by(step).map(move |col| row * cols + col)
        })
    }

    /// In-bounds D8 neighbors of `i`. No-data is not considered here;
    /// see [`crate::Raster::neighbors`].
    pub fn neighbors(&self, i: usize) -> Neighbors {
        Neighbors::new(*self, i)
    }
}
