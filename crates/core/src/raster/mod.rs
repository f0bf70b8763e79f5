//! Grid data structures and index arithmetic

mod dims;
mod element;
mod grid;
mod neighborhood;

pub use dims::GridDims;
pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};
pub use neighborhood::{Neighbors, D8_OFFSETS};
