//! Hydrological preprocessing of Digital Elevation Models
//!
//! - Priority-Flood: O(n log n) depression filling (Barnes 2014)
//! - Flow network: validated single-receiver edge lists
//! - Drainage basins: outlet labeling of a flow network, sequential or
//!   parallel (pointer jumping)

mod drainage_basins;
mod flow_network;
mod priority_flood;

pub use drainage_basins::{
    drainage_basins, label_basins, label_basins_parallel, BasinLabeler, BasinLabels,
    BasinNumbering, BasinParams, BASIN_NODATA,
};
pub use flow_network::FlowNetwork;
pub use priority_flood::{
    fill_sinks, priority_flood, priority_flood_in_place, FillReport, PriorityFlood,
};
