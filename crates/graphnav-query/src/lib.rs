//! `graphnav-query` – geometric queries over a floor's graph and raster.
//!
//! # Modules
//!
//! - [`engine`] – [`NavQuery`][engine::NavQuery]: nearest-node search,
//!   snapping a position estimate onto the graph, and line-of-sight checks,
//!   all borrowing an immutable graph and occupancy map.
//! - [`visibility`] – digital line traversal over the wall raster.
//! - [`projection`] – clamped point-to-segment projection.

pub mod engine;
pub mod projection;
pub mod visibility;

pub use engine::NavQuery;
pub use projection::project_onto_segment;
pub use visibility::is_path_crossing_walls;
