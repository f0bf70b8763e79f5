//! D8 neighborhood enumeration

use super::GridDims;

/// D8 neighbor offsets: (row_offset, col_offset), in row-major order.
///
/// The enumeration order is part of the contract: priority-flood pushes
/// neighbors in this order, which fixes its FIFO tie-breaking.
pub const D8_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Lazy iterator over the in-bounds D8 neighbors of a cell.
///
/// The iterator is `Clone`, so a partially consumed sequence can be
/// restarted from any point, and a fresh one is cheap to build.
#[derive(Debug, Clone)]
pub struct Neighbors {
    dims: GridDims,
    row: isize,
    col: isize,
    next: usize,
}

impl Neighbors {
    pub fn new(dims: GridDims, center: usize) -> Self {
        let (row, col) = dims.coords(center);
        Self {
            dims,
            row: row as isize,
            col: col as isize,
            next: 0,
        }
    }
}

impl Iterator for Neighbors {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.next < D8_OFFSETS.len() {
            let (dr, dc) = D8_OFFSETS[self.next];
            self.next += 1;

            let nr = self.row + dr;
            let nc = self.col + dc;
            if nr < 0
                || nc < 0
                || nr >= self.dims.rows() as isize
                || nc >= self.dims.cols() as isize
            {
                continue;
            }
            return Some(self.dims.index(nr as usize, nc as usize));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(D8_OFFSETS.len() - self.next))
    }
}

impl std::iter::FusedIterator for Neighbors {}
