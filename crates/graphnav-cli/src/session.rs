//! Session state for the interactive shell.
//!
//! A [`FloorPlan`] is the loaded `(Building, NavigationGraph)` pair.  The
//! [`Session`] holds it behind an [`Arc`]; `/load` and `/reload` build a
//! complete new plan first and only then swap it in, so a failed load leaves
//! the previous plan untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use graphnav_graph::{GraphDescription, NavigationGraph, Node};
use graphnav_map::Building;
use graphnav_query::NavQuery;
use graphnav_types::{FloorNumber, MetricPoint, NavError, RasterCoord};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no building loaded; use /load first")]
    NotLoaded,

    #[error(transparent)]
    Nav(#[from] NavError),
}

/// A building together with the navigation graph built over it.
#[derive(Debug)]
pub struct FloorPlan {
    pub building: Building,
    pub graph: NavigationGraph,
}

impl FloorPlan {
    pub fn new(building: Building, graph: NavigationGraph) -> Self {
        Self { building, graph }
    }

    /// Load the building description and graph JSON from disk.
    pub fn load(building_file: &Path, graph_file: &Path) -> Result<Self, NavError> {
        let building = Building::load(building_file)?;
        let description = GraphDescription::load(graph_file)?;
        let graph = NavigationGraph::build(&description, &building)?;
        Ok(Self::new(building, graph))
    }

    /// Query engine over `floor`'s map.
    pub fn query(&self, floor: FloorNumber) -> Result<NavQuery<'_>, NavError> {
        let map = self.building.require_floor(floor)?;
        Ok(NavQuery::new(&self.graph, map))
    }
}

/// Mutable shell state: the current plan, where it came from, the active
/// floor and the wall-check switch.
#[derive(Debug, Default)]
pub struct Session {
    plan: Option<Arc<FloorPlan>>,
    sources: Option<(PathBuf, PathBuf)>,
    floor: FloorNumber,
    check_walls: bool,
}

impl Session {
    pub fn new(floor: FloorNumber, check_walls: bool) -> Self {
        Self {
            plan: None,
            sources: None,
            floor,
            check_walls,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.default_floor, cfg.check_walls)
    }

    /// Session with an already-built plan and no backing files.
    #[cfg(test)]
    pub fn with_plan(plan: FloorPlan, floor: FloorNumber, check_walls: bool) -> Self {
        Self {
            plan: Some(Arc::new(plan)),
            ..Self::new(floor, check_walls)
        }
    }

    /// Load a plan from disk and make it current.  On error the previous
    /// plan stays in place.
    pub fn load(
        &mut self,
        building_file: &Path,
        graph_file: &Path,
    ) -> Result<Arc<FloorPlan>, SessionError> {
        let plan = Arc::new(FloorPlan::load(building_file, graph_file)?);
        info!(
            building = plan.building.name(),
            floors = plan.building.floor_count(),
            nodes = plan.graph.len(),
            "floor plan loaded"
        );
        self.plan = Some(plan.clone());
        self.sources = Some((building_file.to_path_buf(), graph_file.to_path_buf()));
        Ok(plan)
    }

    /// Re-read the files of the last successful [`load`](Self::load).
    pub fn reload(&mut self) -> Result<Arc<FloorPlan>, SessionError> {
        let (building_file, graph_file) = self.sources.clone().ok_or(SessionError::NotLoaded)?;
        self.load(&building_file, &graph_file)
    }

    /// Shared handle to the current plan.
    pub fn plan(&self) -> Option<Arc<FloorPlan>> {
        self.plan.clone()
    }

    pub fn floor(&self) -> FloorNumber {
        self.floor
    }

    pub fn check_walls(&self) -> bool {
        self.check_walls
    }

    pub fn set_check_walls(&mut self, on: bool) {
        self.check_walls = on;
    }

    /// Switch the active floor.  The floor must exist in the loaded building.
    pub fn set_floor(&mut self, floor: FloorNumber) -> Result<(), SessionError> {
        self.require_plan()?.building.require_floor(floor)?;
        debug!(from = self.floor, to = floor, "active floor changed");
        self.floor = floor;
        Ok(())
    }

    /// Closest node to `pos` on the active floor.
    pub fn nearest(&self, pos: MetricPoint) -> Result<Option<Node>, SessionError> {
        let plan = self.require_plan()?;
        let query = plan.query(self.floor)?;
        Ok(query
            .find_closest_node(pos, self.floor, self.check_walls)
            .and_then(|id| plan.graph.node(id).cloned()))
    }

    /// `pos` snapped onto the graph of the active floor.
    pub fn snap(&self, pos: MetricPoint) -> Result<MetricPoint, SessionError> {
        let plan = self.require_plan()?;
        let query = plan.query(self.floor)?;
        Ok(query.snap_to_graph(pos, self.floor, self.check_walls))
    }

    /// Whether the straight raster path crosses a wall on the active floor.
    pub fn walls(&self, start: RasterCoord, end: RasterCoord) -> Result<bool, SessionError> {
        let plan = self.require_plan()?;
        let query = plan.query(self.floor)?;
        Ok(query.is_path_crossing_walls(start, end))
    }

    fn require_plan(&self) -> Result<Arc<FloorPlan>, SessionError> {
        self.plan.clone().ok_or(SessionError::NotLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphnav_map::OccupancyMap;
    use graphnav_types::NodeType;

    /// 20×20 floor 4 with a wall column at col 4 and nodes 1 (2,10),
    /// 2 (12,10), 3 (12,18) joined both ways along 1–2 and 2–3.
    fn plan() -> FloorPlan {
        let mut walls = vec![false; 400];
        for row in 0..20 {
            walls[row * 20 + 4] = true;
        }
        let map = OccupancyMap::from_rasters(20, 20, 1.0, walls, vec![true; 400]).unwrap();
        let building = Building::from_maps("test", [(4, map)]).unwrap();

        let mut n1 = Node::new(1, NodeType::Control, 4, MetricPoint::new(2.0, 10.0));
        let mut n2 = Node::new(2, NodeType::Destination, 4, MetricPoint::new(12.0, 10.0));
        let mut n3 = Node::new(3, NodeType::Link, 4, MetricPoint::new(12.0, 18.0));
        n1.add_edge(2, 10.0, 0.0);
        n2.add_edge(1, 10.0, 180.0);
        n2.add_edge(3, 8.0, 90.0);
        n3.add_edge(2, 8.0, 270.0);
        let graph = NavigationGraph::from_nodes([n1, n2, n3]).unwrap();

        FloorPlan::new(building, graph)
    }

    #[test]
    fn queries_require_a_plan() {
        let session = Session::new(4, false);
        assert!(matches!(
            session.nearest(MetricPoint::new(1.0, 1.0)),
            Err(SessionError::NotLoaded)
        ));
        assert!(matches!(
            session.snap(MetricPoint::new(1.0, 1.0)),
            Err(SessionError::NotLoaded)
        ));
    }

    #[test]
    fn reload_without_load_is_rejected() {
        let mut session = Session::new(0, false);
        assert!(matches!(session.reload(), Err(SessionError::NotLoaded)));
    }

    #[test]
    fn nearest_and_snap_use_active_floor() {
        let session = Session::with_plan(plan(), 4, false);
        let pos = MetricPoint::new(11.0, 10.5);
        assert_eq!(session.nearest(pos).unwrap().unwrap().id, 2);
        let snapped = session.snap(pos).unwrap();
        assert!(snapped.distance(MetricPoint::new(11.0, 10.0)) < 1e-4);
    }

    #[test]
    fn check_walls_switch_is_honoured() {
        let mut session = Session::with_plan(plan(), 4, false);
        let pos = MetricPoint::new(6.0, 10.5);
        assert_eq!(session.nearest(pos).unwrap().unwrap().id, 1);

        session.set_check_walls(true);
        assert!(session.check_walls());
        assert_eq!(session.nearest(pos).unwrap().unwrap().id, 2);
    }

    #[test]
    fn unknown_floor_is_reported() {
        let mut session = Session::with_plan(plan(), 4, false);
        assert!(matches!(
            session.set_floor(7),
            Err(SessionError::Nav(NavError::UnknownFloor(7)))
        ));
        assert_eq!(session.floor(), 4);

        let stray = Session::with_plan(plan(), 9, false);
        assert!(matches!(
            stray.walls(RasterCoord::new(0, 0), RasterCoord::new(0, 1)),
            Err(SessionError::Nav(NavError::UnknownFloor(9)))
        ));
    }

    #[test]
    fn walls_reports_crossing() {
        let session = Session::with_plan(plan(), 4, false);
        assert!(session.walls(RasterCoord::new(10, 1), RasterCoord::new(10, 9)).unwrap());
        assert!(!session.walls(RasterCoord::new(10, 6), RasterCoord::new(10, 19)).unwrap());
    }

    #[test]
    fn failed_load_keeps_previous_plan() {
        let mut session = Session::with_plan(plan(), 4, false);
        let before = session.plan().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let err = session
            .load(&dir.path().join("missing.toml"), &dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Nav(NavError::Io { .. })));

        let after = session.plan().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.graph.len(), 3);
    }
}
