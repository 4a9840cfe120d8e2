//! Navigation Graph.
//!
//! Waypoints ([`Node`]) joined by directed, weighted [`Edge`]s.  Every edge
//! caches the implicit equation of the line through its two endpoints in
//! metric space, so point-to-edge distances at query time cost a handful of
//! multiplications.
//!
//! The line through `p1 = (x1, y1)` and `p2 = (x2, y2)` is the cross product
//! of the two points lifted to homogeneous coordinates `(1, x, y)`:
//!
//! ```text
//! (a, b, c) = (1, x1, y1) × (1, x2, y2) = (x1·y2 − y1·x2,  y1 − y2,  x2 − x1)
//! a + b·x + c·y = 0
//! ```
//!
//! Coincident endpoints produce `(0, 0, 0)`; see [`LineCoeffs::is_degenerate`].
//!
//! # Example
//!
//! ```rust
//! use graphnav_graph::{NavigationGraph, Node};
//! use graphnav_types::{MetricPoint, NodeType};
//!
//! let mut a = Node::new(1, NodeType::Control, 0, MetricPoint::new(0.0, 0.0));
//! let b = Node::new(2, NodeType::Destination, 0, MetricPoint::new(10.0, 0.0));
//! a.add_edge(2, 10.0, 0.0);
//!
//! let graph = NavigationGraph::from_nodes([a, b]).unwrap();
//! let line = graph.node(1).unwrap().edge(2).unwrap().line();
//! assert_eq!(line.distance(MetricPoint::new(5.0, 3.0)), Some(3.0));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use graphnav_map::Building;
use graphnav_types::{FloorNumber, MetricPoint, NavError, NodeId, NodeType, RasterCoord};
use tracing::{debug, info};

use crate::description::GraphDescription;

// ────────────────────────────────────────────────────────────────────────────
// LineCoeffs
// ────────────────────────────────────────────────────────────────────────────

/// Implicit line `a + b·x + c·y = 0` in metric space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineCoeffs {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl LineCoeffs {
    /// The line through `p1` and `p2` (homogeneous cross product).
    pub fn through(p1: MetricPoint, p2: MetricPoint) -> Self {
        Self {
            a: p1.x * p2.y - p1.y * p2.x,
            b: p1.y - p2.y,
            c: p2.x - p1.x,
        }
    }

    /// True for the zero vector produced by coincident endpoints, which
    /// describes no line at all.
    pub fn is_degenerate(&self) -> bool {
        self.b == 0.0 && self.c == 0.0
    }

    /// Signed perpendicular distance from `p` to the line, or `None` for a
    /// degenerate line.
    pub fn signed_distance(&self, p: MetricPoint) -> Option<f32> {
        if self.is_degenerate() {
            return None;
        }
        Some((self.a + self.b * p.x + self.c * p.y) / (self.b * self.b + self.c * self.c).sqrt())
    }

    /// Unsigned perpendicular distance from `p` to the line.
    pub fn distance(&self, p: MetricPoint) -> Option<f32> {
        self.signed_distance(p).map(f32::abs)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Edge / Node
// ────────────────────────────────────────────────────────────────────────────

/// Directed edge towards the node it is keyed by in [`Node::edges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Edge length in metric units.
    pub length: f32,
    /// Bearing from source to destination, in degrees.
    pub angle_deg: f32,
    line: LineCoeffs,
}

impl Edge {
    /// Cached line through both endpoints.
    pub fn line(&self) -> LineCoeffs {
        self.line
    }
}

/// A waypoint of the navigation graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub floor: FloorNumber,
    /// Position in metric space.
    pub position: MetricPoint,
    pub label: String,
    pub is_door: bool,
    pub comments: String,
    edges: BTreeMap<NodeId, Edge>,
}

impl Node {
    /// A node without edges, label or comments.
    pub fn new(id: NodeId, node_type: NodeType, floor: FloorNumber, position: MetricPoint) -> Self {
        Self {
            id,
            node_type,
            floor,
            position,
            label: String::new(),
            is_door: false,
            comments: String::new(),
            edges: BTreeMap::new(),
        }
    }

    /// Declare an outgoing edge to `destination`, replacing any previous one.
    ///
    /// The line equation is filled in when the node is handed to
    /// [`NavigationGraph::from_nodes`].
    pub fn add_edge(&mut self, destination: NodeId, length: f32, angle_deg: f32) {
        self.edges.insert(
            destination,
            Edge {
                length,
                angle_deg,
                line: LineCoeffs::default(),
            },
        );
    }

    /// Outgoing edges keyed by destination id, in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, &Edge)> {
        self.edges.iter().map(|(id, e)| (*id, e))
    }

    pub fn edge(&self, destination: NodeId) -> Option<&Edge> {
        self.edges.get(&destination)
    }

    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// NavigationGraph
// ────────────────────────────────────────────────────────────────────────────

/// Read-only graph of waypoints for a building.
///
/// Nodes are kept in ascending id order, so every scan over the graph visits
/// them in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationGraph {
    nodes: BTreeMap<NodeId, Node>,
}

impl NavigationGraph {
    /// Assemble a graph from fully-declared nodes and cache every edge's
    /// line equation.
    ///
    /// # Errors
    ///
    /// - [`NavError::DuplicateNode`] when two nodes share an id.
    /// - [`NavError::UnknownNode`] when an edge points at an id that is not
    ///   among `nodes`.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self, NavError> {
        let mut by_id = BTreeMap::new();
        for node in nodes {
            let id = node.id;
            if by_id.insert(id, node).is_some() {
                return Err(NavError::DuplicateNode(id));
            }
        }

        let positions: BTreeMap<NodeId, MetricPoint> =
            by_id.iter().map(|(id, n)| (*id, n.position)).collect();
        let mut degenerate = 0usize;
        for node in by_id.values_mut() {
            let from = node.position;
            for (dest, edge) in node.edges.iter_mut() {
                let to = positions.get(dest).ok_or(NavError::UnknownNode(*dest))?;
                edge.line = LineCoeffs::through(from, *to);
                if edge.line.is_degenerate() {
                    degenerate += 1;
                    debug!(from = node.id, to = *dest, "degenerate edge: endpoints coincide");
                }
            }
        }

        let graph = Self { nodes: by_id };
        info!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            degenerate_edges = degenerate,
            "navigation graph built"
        );
        Ok(graph)
    }

    /// Build the graph described by `description`, placing every node with
    /// the occupancy map of its own floor.
    ///
    /// Edge `i → j` exists when `weights[i][j] > 0`; its length is
    /// `weights[i][j] · scale(floor of i)` and its bearing `angles[i][j]`.
    ///
    /// # Errors
    ///
    /// - [`NavError::MalformedAdjacency`] for non-square or differently-sized
    ///   matrices, or a node id with no matrix row.
    /// - [`NavError::DimensionMismatch`] when the matrix size differs from the
    ///   node count.
    /// - [`NavError::UnknownFloor`] for a node on a floor the building lacks.
    /// - Everything [`NavigationGraph::from_nodes`] reports.
    pub fn build(description: &GraphDescription, building: &Building) -> Result<Self, NavError> {
        let size = validate_matrices(description)?;

        let mut nodes = Vec::with_capacity(description.nodes.len());
        for desc in &description.nodes {
            if desc.id == 0 || desc.id as usize > size {
                return Err(NavError::MalformedAdjacency(format!(
                    "node id {} has no row in the {size}x{size} matrices",
                    desc.id
                )));
            }
            let map = building.require_floor(desc.floor)?;
            // Positions are stored as [col, row] pixels.
            let pixel = RasterCoord::new(desc.position[1] as i32, desc.position[0] as i32);

            let mut node = Node::new(desc.id, desc.node_type, desc.floor, map.raster_to_metric(pixel));
            node.label = desc.label.clone();
            node.is_door = desc.is_door;
            node.comments = desc.comments.clone();

            let rank = desc.id as usize - 1;
            let weights = &description.weights[rank];
            let angles = &description.angles[rank];
            for (j, (&w, &angle)) in weights.iter().zip(angles).enumerate() {
                if w > 0.0 {
                    node.add_edge(j as NodeId + 1, w * map.scale(), angle);
                }
            }
            nodes.push(node);
        }

        Self::from_nodes(nodes)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes on `floor`, in ascending id order.
    pub fn nodes_on_floor(&self, floor: FloorNumber) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.floor == floor)
    }

    /// Floors that hold at least one node.
    pub fn floors(&self) -> BTreeSet<FloorNumber> {
        self.nodes.values().map(|n| n.floor).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Node::degree).sum()
    }
}

/// Check that both matrices are square, equally sized and match the node
/// count.  Returns the matrix size.
fn validate_matrices(description: &GraphDescription) -> Result<usize, NavError> {
    let size = description.weights.len();
    for (name, matrix) in [("weights", &description.weights), ("angles", &description.angles)] {
        if matrix.len() != size {
            return Err(NavError::MalformedAdjacency(format!(
                "{name} has {} rows, weights has {size}",
                matrix.len()
            )));
        }
        if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(NavError::MalformedAdjacency(format!(
                "{name} row {i} has {} entries, expected {size}",
                row.len()
            )));
        }
    }
    if description.nodes.len() != size {
        return Err(NavError::DimensionMismatch {
            what: "node count vs adjacency matrix size".to_string(),
            expected: size,
            found: description.nodes.len(),
        });
    }
    Ok(size)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::NodeDescription;
    use graphnav_map::OccupancyMap;

    fn building(scale: f32) -> Building {
        let map = OccupancyMap::from_rasters(40, 40, scale, vec![false; 1600], vec![true; 1600])
            .unwrap();
        Building::from_maps("test", [(4, map)]).unwrap()
    }

    fn node_desc(id: NodeId, floor: FloorNumber, position: [f32; 2]) -> NodeDescription {
        NodeDescription {
            id,
            node_type: NodeType::Control,
            floor,
            label: format!("n{id}"),
            is_door: false,
            comments: String::new(),
            position,
        }
    }

    fn three_node_description() -> GraphDescription {
        GraphDescription {
            weights: vec![
                vec![0.0, 5.0, 0.0],
                vec![5.0, 0.0, -1.0],
                vec![0.0, 0.0, 0.0],
            ],
            angles: vec![
                vec![0.0, 90.0, 0.0],
                vec![270.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0],
            ],
            nodes: vec![
                node_desc(2, 4, [10.0, 40.0]),
                node_desc(1, 4, [0.0, 40.0]),
                node_desc(3, 4, [10.0, 30.0]),
            ],
        }
    }

    // ── LineCoeffs ──────────────────────────────────────────────────────────

    #[test]
    fn line_through_two_points_contains_both() {
        let p1 = MetricPoint::new(1.0, 2.0);
        let p2 = MetricPoint::new(4.0, -3.0);
        let line = LineCoeffs::through(p1, p2);
        assert!(line.signed_distance(p1).unwrap().abs() < 1e-5);
        assert!(line.signed_distance(p2).unwrap().abs() < 1e-5);
    }

    #[test]
    fn line_coefficients_match_homogeneous_cross_product() {
        let line = LineCoeffs::through(MetricPoint::new(0.0, 0.0), MetricPoint::new(10.0, 0.0));
        assert_eq!(line, LineCoeffs { a: 0.0, b: 0.0, c: 10.0 });
        assert_eq!(line.distance(MetricPoint::new(3.0, -4.0)), Some(4.0));
        assert_eq!(line.signed_distance(MetricPoint::new(3.0, -4.0)), Some(-4.0));
    }

    #[test]
    fn coincident_points_give_degenerate_line() {
        let p = MetricPoint::new(2.0, 2.0);
        let line = LineCoeffs::through(p, p);
        assert!(line.is_degenerate());
        assert_eq!(line.distance(MetricPoint::new(0.0, 0.0)), None);
    }

    // ── from_nodes ──────────────────────────────────────────────────────────

    #[test]
    fn from_nodes_caches_line_coefficients() {
        let mut a = Node::new(1, NodeType::Control, 0, MetricPoint::new(0.0, 0.0));
        let mut b = Node::new(2, NodeType::Link, 0, MetricPoint::new(0.0, 5.0));
        a.add_edge(2, 5.0, 90.0);
        b.add_edge(1, 5.0, 270.0);
        let graph = NavigationGraph::from_nodes([a, b]).unwrap();

        let ab = graph.node(1).unwrap().edge(2).unwrap().line();
        assert_eq!(ab, LineCoeffs::through(MetricPoint::new(0.0, 0.0), MetricPoint::new(0.0, 5.0)));
        assert!(!ab.is_degenerate());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn from_nodes_rejects_duplicate_id() {
        let a = Node::new(1, NodeType::Control, 0, MetricPoint::default());
        let b = Node::new(1, NodeType::Control, 0, MetricPoint::default());
        assert_eq!(NavigationGraph::from_nodes([a, b]), Err(NavError::DuplicateNode(1)));
    }

    #[test]
    fn from_nodes_rejects_unknown_destination() {
        let mut a = Node::new(1, NodeType::Control, 0, MetricPoint::default());
        a.add_edge(9, 1.0, 0.0);
        assert_eq!(NavigationGraph::from_nodes([a]), Err(NavError::UnknownNode(9)));
    }

    #[test]
    fn nodes_iterate_in_ascending_id_order() {
        let nodes = [3, 1, 2].map(|id| Node::new(id, NodeType::Link, id as i32 % 2, MetricPoint::default()));
        let graph = NavigationGraph::from_nodes(nodes).unwrap();
        assert_eq!(graph.nodes().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(graph.nodes_on_floor(1).map(|n| n.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(graph.floors().into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    // ── build ───────────────────────────────────────────────────────────────

    #[test]
    fn build_converts_positions_and_scales_lengths() {
        let graph = NavigationGraph::build(&three_node_description(), &building(2.0)).unwrap();
        assert_eq!(graph.len(), 3);

        // [col, row] = [10, 40] on a 40-row raster at 2 px/unit → (5, 0).
        let n2 = graph.node(2).unwrap();
        assert_eq!(n2.position, MetricPoint::new(5.0, 0.0));
        assert_eq!(n2.label, "n2");
        assert_eq!(graph.node(3).unwrap().position, MetricPoint::new(5.0, 5.0));

        let e12 = graph.node(1).unwrap().edge(2).unwrap();
        assert_eq!(e12.length, 10.0);
        assert_eq!(e12.angle_deg, 90.0);
    }

    #[test]
    fn build_skips_non_positive_weights() {
        let graph = NavigationGraph::build(&three_node_description(), &building(1.0)).unwrap();
        let n2 = graph.node(2).unwrap();
        assert!(n2.edge(1).is_some());
        assert!(n2.edge(3).is_none(), "negative weight must not create an edge");
        assert_eq!(graph.node(3).unwrap().degree(), 0);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn build_rejects_non_square_matrix() {
        let mut desc = three_node_description();
        desc.weights[1].pop();
        assert!(matches!(
            NavigationGraph::build(&desc, &building(1.0)),
            Err(NavError::MalformedAdjacency(_))
        ));
    }

    #[test]
    fn build_rejects_angle_matrix_of_other_size() {
        let mut desc = three_node_description();
        desc.angles.pop();
        assert!(matches!(
            NavigationGraph::build(&desc, &building(1.0)),
            Err(NavError::MalformedAdjacency(_))
        ));
    }

    #[test]
    fn build_rejects_node_count_mismatch() {
        let mut desc = three_node_description();
        desc.nodes.pop();
        assert_eq!(
            NavigationGraph::build(&desc, &building(1.0)),
            Err(NavError::DimensionMismatch {
                what: "node count vs adjacency matrix size".to_string(),
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn build_rejects_id_without_matrix_row() {
        let mut desc = three_node_description();
        desc.nodes[2].id = 7;
        assert!(matches!(
            NavigationGraph::build(&desc, &building(1.0)),
            Err(NavError::MalformedAdjacency(_))
        ));
    }

    #[test]
    fn build_rejects_duplicate_ids() {
        let mut desc = three_node_description();
        desc.nodes[2].id = 1;
        assert_eq!(
            NavigationGraph::build(&desc, &building(1.0)),
            Err(NavError::DuplicateNode(1))
        );
    }

    #[test]
    fn build_rejects_unknown_floor() {
        let mut desc = three_node_description();
        desc.nodes[0].floor = 9;
        assert_eq!(
            NavigationGraph::build(&desc, &building(1.0)),
            Err(NavError::UnknownFloor(9))
        );
    }
}
