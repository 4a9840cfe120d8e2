use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a graph node. Ids are positive and unique within a graph;
/// the node with id `n` owns row `n - 1` of the adjacency matrices.
pub type NodeId = u32;

/// Building floor index as written in the building description.
pub type FloorNumber = i32;

/// A point in metric ("UV") space: floor-plan units, origin at the
/// bottom-left corner of the plan, `y` growing upwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricPoint {
    pub x: f32,
    pub y: f32,
}

impl MetricPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Squared Euclidean norm.
    pub fn norm_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).norm_squared()
    }

    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

impl Add for MetricPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for MetricPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for MetricPoint {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::fmt::Display for MetricPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// A pixel index in raster space: origin at the top-left corner of the
/// floor-plan image, `row` growing downwards.
///
/// Coordinates are signed so that positions outside the image can be
/// represented and rejected by the map instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RasterCoord {
    pub row: i32,
    pub col: i32,
}

impl RasterCoord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for RasterCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[r{}, c{}]", self.row, self.col)
    }
}

/// Role of a waypoint in the hand-authored graph. Purely descriptive; no
/// query treats the variants differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Decision point along a corridor.
    Control,
    /// Room, office or other place a user may ask to reach.
    Destination,
    /// Connector between corridors or floors.
    Link,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Control => write!(f, "control"),
            NodeType::Destination => write!(f, "destination"),
            NodeType::Link => write!(f, "link"),
        }
    }
}

/// Error type shared by the map, graph and query crates.
///
/// Everything except [`NavError::OutOfRange`] is a construction error: it is
/// raised while loading a floor and nothing is built when it occurs.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NavError {
    #[error("Coordinate [r{row}, c{col}] is outside the {height}x{width} raster")]
    OutOfRange {
        row: i32,
        col: i32,
        width: u32,
        height: u32,
    },

    #[error("Malformed adjacency data: {0}")]
    MalformedAdjacency(String),

    #[error("Dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("Unknown node id {0}")]
    UnknownNode(NodeId),

    #[error("No occupancy map for floor {0}")]
    UnknownFloor(FloorNumber),

    #[error("Floor {0} is described more than once")]
    DuplicateFloor(FloorNumber),

    #[error("Failed to load raster {path}: {details}")]
    RasterLoad { path: String, details: String },

    #[error("Raster size mismatch: walls are {walls:?}, walkable mask is {walkable:?}")]
    RasterSizeMismatch {
        walls: (u32, u32),
        walkable: (u32, u32),
    },

    #[error("Invalid map scale {0}: must be positive and finite")]
    InvalidScale(f32),

    #[error("I/O error on {path}: {details}")]
    Io { path: String, details: String },

    #[error("Parse error: {0}")]
    Parse(String),
}
