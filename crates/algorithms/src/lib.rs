//! # topohydro Algorithms
//!
//! Hydrological preprocessing for raster digital elevation models.
//!
//! - **hydrology**: Priority-Flood sink filling, flow network validation,
//!   drainage basin labeling
//!
//! Enable the `parallel` feature (on by default) to run the parallel
//! basin labeling on rayon's thread pool.

pub mod hydrology;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::hydrology::{
        drainage_basins, fill_sinks, label_basins, label_basins_parallel, priority_flood,
        priority_flood_in_place, BasinLabeler, BasinLabels, BasinNumbering, BasinParams,
        FillReport, FlowNetwork, PriorityFlood, BASIN_NODATA,
    };
    pub use topohydro_core::prelude::*;
}
