//! Nearest-node, snap and wall queries for one floor.
//!
//! [`NavQuery`] borrows a [`NavigationGraph`] and the [`OccupancyMap`] of
//! the floor being queried.  It holds no state of its own: switching floors
//! means building a new `NavQuery` over the other floor's map.
//!
//! # Example
//!
//! ```rust
//! use graphnav_graph::{NavigationGraph, Node};
//! use graphnav_map::OccupancyMap;
//! use graphnav_query::NavQuery;
//! use graphnav_types::{MetricPoint, NodeType};
//!
//! let mut a = Node::new(1, NodeType::Control, 0, MetricPoint::new(0.0, 1.0));
//! let mut b = Node::new(2, NodeType::Destination, 0, MetricPoint::new(10.0, 1.0));
//! a.add_edge(2, 10.0, 0.0);
//! b.add_edge(1, 10.0, 180.0);
//! let graph = NavigationGraph::from_nodes([a, b]).unwrap();
//! let map = OccupancyMap::from_rasters(20, 20, 1.0, vec![false; 400], vec![true; 400]).unwrap();
//!
//! let query = NavQuery::new(&graph, &map);
//! assert_eq!(query.find_closest_node(MetricPoint::new(8.0, 3.0), 0, false), Some(2));
//! assert_eq!(query.snap_to_graph(MetricPoint::new(4.0, 3.0), 0, false), MetricPoint::new(4.0, 1.0));
//! ```

use graphnav_graph::NavigationGraph;
use graphnav_map::OccupancyMap;
use graphnav_types::{FloorNumber, MetricPoint, NodeId, RasterCoord};
use tracing::debug;

use crate::projection::project_onto_segment;
use crate::visibility;

/// Read-only query engine over a graph and one floor's occupancy map.
#[derive(Debug, Clone, Copy)]
pub struct NavQuery<'a> {
    graph: &'a NavigationGraph,
    map: &'a OccupancyMap,
}

impl<'a> NavQuery<'a> {
    pub fn new(graph: &'a NavigationGraph, map: &'a OccupancyMap) -> Self {
        Self { graph, map }
    }

    pub fn graph(&self) -> &'a NavigationGraph {
        self.graph
    }

    pub fn map(&self) -> &'a OccupancyMap {
        self.map
    }

    /// Id of the node on `floor` closest to `pos`, or `None` when the floor
    /// has no (visible) node.
    ///
    /// Nodes are scanned in ascending id order and only a strictly smaller
    /// distance replaces the current best, so among exact ties the lowest id
    /// wins.  With `check_walls`, nodes whose straight line from `pos` crosses
    /// a wall are skipped; a `pos` outside the raster sees no node at all.
    pub fn find_closest_node(
        &self,
        pos: MetricPoint,
        floor: FloorNumber,
        check_walls: bool,
    ) -> Option<NodeId> {
        let origin = if check_walls {
            match self.map.metric_to_raster(pos) {
                Ok(r) => Some(r),
                Err(e) => {
                    debug!(%pos, error = %e, "query position outside the map; no node is visible");
                    return None;
                }
            }
        } else {
            None
        };

        let mut best: Option<(NodeId, f32)> = None;
        for node in self.graph.nodes_on_floor(floor) {
            let d = pos.distance_squared(node.position);
            if best.is_some_and(|(_, min)| d >= min) {
                continue;
            }
            if let Some(origin) = origin
                && !self.is_raster_target_visible(origin, node.position)
            {
                debug!(node = node.id, "candidate node hidden behind a wall");
                continue;
            }
            best = Some((node.id, d));
        }
        best.map(|(id, _)| id)
    }

    /// Project `pos` onto the closest edge around its nearest node.
    ///
    /// 1. Find the nearest node (see [`find_closest_node`](Self::find_closest_node)).
    /// 2. Among its outgoing edges pick the one whose line is closest to
    ///    `pos`, using the cached line equation.  A degenerate edge is
    ///    measured by the distance to its single point.
    /// 3. Project `pos` onto that edge's segment, clamped to the endpoints.
    ///
    /// Returns `pos` unchanged when no node or no edge qualifies.  With
    /// `check_walls`, edges whose projected point is hidden from `pos` are
    /// skipped.  The result is the best point in the nearest node's 1-hop
    /// neighbourhood, not across the whole graph.
    pub fn snap_to_graph(&self, pos: MetricPoint, floor: FloorNumber, check_walls: bool) -> MetricPoint {
        let Some(node) = self
            .find_closest_node(pos, floor, check_walls)
            .and_then(|id| self.graph.node(id))
        else {
            return pos;
        };

        let mut best: Option<(f32, MetricPoint)> = None;
        for (dest_id, edge) in node.edges() {
            let Some(dest) = self.graph.node(dest_id) else {
                continue;
            };
            let d = edge
                .line()
                .distance(pos)
                .unwrap_or_else(|| pos.distance(node.position));
            if best.is_some_and(|(min, _)| d >= min) {
                continue;
            }
            let projected = project_onto_segment(node.position, dest.position, pos);
            if check_walls && !self.is_segment_visible(pos, projected) {
                debug!(from = node.id, to = dest_id, "edge projection hidden behind a wall");
                continue;
            }
            best = Some((d, projected));
        }

        match best {
            Some((d, projected)) => {
                debug!(node = node.id, distance = d, %projected, "snapped to graph");
                projected
            }
            None => pos,
        }
    }

    /// Digital line test between two raster pixels; see
    /// [`visibility::is_path_crossing_walls`].
    pub fn is_path_crossing_walls(&self, start: RasterCoord, end: RasterCoord) -> bool {
        visibility::is_path_crossing_walls(self.map, start, end)
    }

    /// True when both metric points lie on the map and the straight path
    /// between them touches no wall pixel.
    pub fn is_segment_visible(&self, from: MetricPoint, to: MetricPoint) -> bool {
        match self.map.metric_to_raster(from) {
            Ok(start) => self.is_raster_target_visible(start, to),
            Err(_) => false,
        }
    }

    fn is_raster_target_visible(&self, start: RasterCoord, to: MetricPoint) -> bool {
        match self.map.metric_to_raster(to) {
            Ok(end) => !self.is_path_crossing_walls(start, end),
            Err(_) => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
