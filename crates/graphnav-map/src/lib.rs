//! `graphnav-map` – floor plans as occupancy rasters.
//!
//! # Modules
//!
//! - [`occupancy`] – [`OccupancyMap`][occupancy::OccupancyMap]: binary wall
//!   and walkable rasters for one floor, plus the conversion between metric
//!   coordinates (origin bottom-left) and raster indices (origin top-left).
//! - [`building`] – [`Building`][building::Building]: every floor of a
//!   building, loaded from a `building.toml` description and grayscale
//!   raster images.

pub mod building;
pub mod occupancy;

pub use building::{Building, BuildingDescription, FloorDescription};
pub use occupancy::OccupancyMap;
