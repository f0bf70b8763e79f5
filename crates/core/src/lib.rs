//! # topohydro Core
//!
//! Core types and traits shared by the topohydro hydrology algorithms.
//!
//! This crate provides:
//! - `GridDims`: immutable `(rows, cols)` parameter object and index arithmetic
//! - `Raster<T>`: row-major grid with an optional no-data value
//! - `Error`: the error taxonomy reported by every algorithm
//! - Algorithm traits for consistent API

pub mod error;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{GridDims, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GridDims, Raster, RasterElement};
    pub use crate::{Algorithm, ParallelAlgorithm};
}

/// Core trait for all algorithms in topohydro.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

/// Algorithms with a parallel entry point.
///
/// Implementations must return exactly what [`Algorithm::execute`] returns
/// for the same input, bit for bit.
pub trait ParallelAlgorithm: Algorithm {
    /// Execute in parallel using available cores
    fn execute_parallel(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;
}
