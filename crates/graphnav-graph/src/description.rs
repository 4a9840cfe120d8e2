//! JSON schema of a hand-authored navigation graph.
//!
//! ```json
//! {
//!   "weights": [[0, 1.5], [1.5, 0]],
//!   "angles":  [[0, 90],  [270, 0]],
//!   "nodes": [
//!     { "lobby": { "id": 1, "type": "control", "floor": "4", "label": "Lobby",
//!                  "isDoor": 0, "comments": "", "position": [120, 340] },
//!       "office": { "id": 2, "type": "destination", "floor": 4, "label": "401",
//!                   "isDoor": true, "comments": "", "position": [120, 300] } }
//!   ]
//! }
//! ```
//!
//! `weights[i][j] > 0` declares an edge from node `i + 1` to node `j + 1`;
//! `angles[i][j]` is its bearing in degrees.  `nodes` is a list of objects
//! whose values are node records; the keys are ignored.  `position` is the
//! node's pixel position as `[col, row]` on its floor's raster.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use graphnav_types::{FloorNumber, NavError, NodeId, NodeType};
use serde::{Deserialize, Deserializer};

/// Parsed graph file: adjacency matrices indexed by node rank (`id − 1`)
/// plus per-node metadata.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GraphDescription {
    pub weights: Vec<Vec<f32>>,
    pub angles: Vec<Vec<f32>>,
    #[serde(deserialize_with = "flatten_node_groups")]
    pub nodes: Vec<NodeDescription>,
}

/// Metadata of a single node as written by the authoring tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeDescription {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(deserialize_with = "floor_from_int_or_string")]
    pub floor: FloorNumber,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isDoor", default, deserialize_with = "bool_from_int_or_bool")]
    pub is_door: bool,
    #[serde(default)]
    pub comments: String,
    /// Pixel position `[col, row]`.
    pub position: [f32; 2],
}

impl GraphDescription {
    pub fn from_json(raw: &str) -> Result<Self, NavError> {
        serde_json::from_str(raw).map_err(|e| NavError::Parse(format!("graph description: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NavError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| NavError::Io {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        Self::from_json(&raw)
    }
}

fn flatten_node_groups<'de, D>(deserializer: D) -> Result<Vec<NodeDescription>, D::Error>
where
    D: Deserializer<'de>,
{
    let groups: Vec<BTreeMap<String, NodeDescription>> = Vec::deserialize(deserializer)?;
    Ok(groups.into_iter().flat_map(|g| g.into_values()).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

fn floor_from_int_or_string<'de, D>(deserializer: D) -> Result<FloorNumber, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(v) => FloorNumber::try_from(v).map_err(D::Error::custom),
        IntOrString::Str(s) => s
            .trim()
            .parse::<FloorNumber>()
            .map_err(|e| D::Error::custom(format!("invalid floor '{s}': {e}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrBool {
    Bool(bool),
    Int(i64),
}

fn bool_from_int_or_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IntOrBool::deserialize(deserializer)? {
        IntOrBool::Bool(b) => b,
        IntOrBool::Int(v) => v != 0,
    })
}
