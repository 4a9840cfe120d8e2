//! `graphnav-graph` – the hand-authored waypoint graph.
//!
//! # Modules
//!
//! - [`description`] – [`GraphDescription`][description::GraphDescription]:
//!   JSON schema of the authoring tool's output (weight and angle matrices
//!   plus node metadata).
//! - [`graph`] – [`NavigationGraph`][graph::NavigationGraph]: nodes and
//!   directed edges in metric space, each edge caching the line through its
//!   endpoints for fast point-to-edge distances.

pub mod description;
pub mod graph;

pub use description::{GraphDescription, NodeDescription};
pub use graph::{Edge, LineCoeffs, NavigationGraph, Node};
