//! Error types for topohydro

use thiserror::Error;

/// Main error type for topohydro operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid grid: {rows}x{cols} with {len} cells ({reason})")]
    InvalidGrid {
        rows: usize,
        cols: usize,
        len: usize,
        reason: &'static str,
    },

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Malformed flow network at edge {edge}: {reason}")]
    MalformedNetwork { edge: usize, reason: String },

    #[error("Cyclic flow network: chain through cell {cell} does not reach an outlet after {steps} steps")]
    CyclicNetwork { cell: usize, steps: usize },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a zero-sized or inconsistent grid declaration.
    pub fn invalid_grid(rows: usize, cols: usize, len: usize, reason: &'static str) -> Self {
        Error::InvalidGrid {
            rows,
            cols,
            len,
            reason,
        }
    }

    /// Shorthand for an edge list defect.
    pub fn malformed(edge: usize, reason: impl Into<String>) -> Self {
        Error::MalformedNetwork {
            edge,
            reason: reason.into(),
        }
    }
}

/// Result type alias for topohydro operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_defect() {
        let err = Error::invalid_grid(0, 4, 0, "zero dimension");
        assert_eq!(err.to_string(), "Invalid grid: 0x4 with 0 cells (zero dimension)");

        let err = Error::malformed(3, "duplicate source 7");
        assert!(err.to_string().contains("edge 3"));

        let err = Error::CyclicNetwork { cell: 1, steps: 2 };
        assert!(err.to_string().contains("cell 1"));
    }
}
