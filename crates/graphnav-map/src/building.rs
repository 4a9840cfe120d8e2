//! Building description – the set of per-floor occupancy maps.
//!
//! A building is described by a small TOML file listing every floor with
//! its raster images and scale:
//!
//! ```toml
//! name = "SKERI"
//!
//! [[floors]]
//! id = 4
//! walls = "floor4_walls.png"
//! walkable = "floor4_walkable.png"
//! scale = 24.5
//! ```
//!
//! Image paths are resolved relative to the description file.  The whole
//! description is validated once by [`Building::load`]; a building either
//! loads completely or not at all.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use graphnav_types::{FloorNumber, NavError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::occupancy::OccupancyMap;

/// On-disk schema of `building.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDescription {
    /// Human readable building / location name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub floors: Vec<FloorDescription>,
}

/// One `[[floors]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorDescription {
    pub id: FloorNumber,
    /// Grayscale wall image; non-zero pixels are walls.
    pub walls: PathBuf,
    /// Grayscale walkable mask; non-zero pixels are traversable.
    pub walkable: PathBuf,
    /// Pixels per metric unit.
    pub scale: f32,
}

impl BuildingDescription {
    /// Parse a description from TOML text.
    pub fn from_toml(raw: &str) -> Result<Self, NavError> {
        toml::from_str(raw).map_err(|e| NavError::Parse(format!("building description: {e}")))
    }
}

/// All floors of a building, keyed by floor number.
#[derive(Debug, Clone, Default)]
pub struct Building {
    name: String,
    floors: BTreeMap<FloorNumber, OccupancyMap>,
}

impl Building {
    /// Assemble a building from already-built maps.
    ///
    /// # Errors
    ///
    /// [`NavError::DuplicateFloor`] when two maps share a floor number.
    pub fn from_maps(
        name: impl Into<String>,
        maps: impl IntoIterator<Item = (FloorNumber, OccupancyMap)>,
    ) -> Result<Self, NavError> {
        let mut floors = BTreeMap::new();
        for (floor, map) in maps {
            if floors.insert(floor, map).is_some() {
                return Err(NavError::DuplicateFloor(floor));
            }
        }
        Ok(Self {
            name: name.into(),
            floors,
        })
    }

    /// Load `building.toml` and every raster it references.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NavError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| NavError::Io {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        let description = BuildingDescription::from_toml(&raw)?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::from_description(&description, base_dir)
    }

    /// Build every floor of `description`, resolving image paths against
    /// `base_dir`.
    pub fn from_description(
        description: &BuildingDescription,
        base_dir: &Path,
    ) -> Result<Self, NavError> {
        let mut maps = Vec::with_capacity(description.floors.len());
        for floor in &description.floors {
            let walls = load_gray(&base_dir.join(&floor.walls))?;
            let walkable = load_gray(&base_dir.join(&floor.walkable))?;
            let map = OccupancyMap::from_gray_images(&walls, &walkable, floor.scale)?;
            debug!(
                floor = floor.id,
                width = map.width(),
                height = map.height(),
                scale = map.scale(),
                wall_pixels = map.wall_pixel_count(),
                "floor raster loaded"
            );
            maps.push((floor.id, map));
        }
        let building = Self::from_maps(description.name.clone(), maps)?;
        info!(
            building = %building.name,
            floors = building.floors.len(),
            "building loaded"
        );
        Ok(building)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Map of `floor`, if the building has one.
    pub fn floor(&self, floor: FloorNumber) -> Option<&OccupancyMap> {
        self.floors.get(&floor)
    }

    /// Map of `floor`, or [`NavError::UnknownFloor`].
    pub fn require_floor(&self, floor: FloorNumber) -> Result<&OccupancyMap, NavError> {
        self.floor(floor).ok_or(NavError::UnknownFloor(floor))
    }

    /// Floor numbers in ascending order.
    pub fn floor_numbers(&self) -> impl Iterator<Item = FloorNumber> + '_ {
        self.floors.keys().copied()
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }
}

fn load_gray(path: &Path) -> Result<image::GrayImage, NavError> {
    image::open(path)
        .map(|img| img.into_luma8())
        .map_err(|e| NavError::RasterLoad {
            path: path.display().to_string(),
            details: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphnav_types::RasterCoord;
    use image::{GrayImage, Luma};

    fn write_floor_images(dir: &Path, prefix: &str, width: u32, height: u32) {
        let walls = GrayImage::from_fn(width, height, |x, _| Luma([if x == 0 { 255 } else { 0 }]));
        let walkable = GrayImage::from_fn(width, height, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        walls.save(dir.join(format!("{prefix}_walls.png"))).expect("save walls");
        walkable
            .save(dir.join(format!("{prefix}_walkable.png")))
            .expect("save walkable");
    }

    #[test]
    fn parses_description_and_ignores_unknown_keys() {
        let raw = r#"
            name = "Lab"
            rois = "ignored.png"

            [[floors]]
            id = 2
            walls = "w.png"
            walkable = "k.png"
            scale = 10.0
            features_file = "features.yml"
        "#;
        let desc = BuildingDescription::from_toml(raw).unwrap();
        assert_eq!(desc.name, "Lab");
        assert_eq!(desc.floors.len(), 1);
        assert_eq!(desc.floors[0].id, 2);
        assert_eq!(desc.floors[0].walls, PathBuf::from("w.png"));
    }

    #[test]
    fn malformed_description_is_parse_error() {
        let err = BuildingDescription::from_toml("[[floors]]\nid = \"four\"").unwrap_err();
        assert!(matches!(err, NavError::Parse(_)));
    }

    #[test]
    fn load_builds_every_floor() {
        let dir = tempfile::tempdir().expect("tmp dir");
        write_floor_images(dir.path(), "f1", 8, 6);
        write_floor_images(dir.path(), "f2", 4, 4);
        let toml = r#"
            name = "Test Building"

            [[floors]]
            id = 1
            walls = "f1_walls.png"
            walkable = "f1_walkable.png"
            scale = 2.0

            [[floors]]
            id = 2
            walls = "f2_walls.png"
            walkable = "f2_walkable.png"
            scale = 1.0
        "#;
        let path = dir.path().join("building.toml");
        fs::write(&path, toml).unwrap();

        let building = Building::load(&path).expect("load");
        assert_eq!(building.name(), "Test Building");
        assert_eq!(building.floor_numbers().collect::<Vec<_>>(), vec![1, 2]);

        let f1 = building.require_floor(1).unwrap();
        assert_eq!(f1.size_pixels(), (8, 6));
        assert!(f1.is_wall(RasterCoord::new(3, 0)));
        assert!(f1.is_walkable(RasterCoord::new(3, 1)));
        assert!(building.floor(3).is_none());
        assert_eq!(building.require_floor(3).unwrap_err(), NavError::UnknownFloor(3));
    }

    #[test]
    fn missing_raster_is_raster_load_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let desc = BuildingDescription {
            name: "Nowhere".to_string(),
            floors: vec![FloorDescription {
                id: 1,
                walls: PathBuf::from("missing.png"),
                walkable: PathBuf::from("missing.png"),
                scale: 1.0,
            }],
        };
        let err = Building::from_description(&desc, dir.path()).unwrap_err();
        assert!(matches!(err, NavError::RasterLoad { .. }));
    }

    #[test]
    fn missing_description_is_io_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let err = Building::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, NavError::Io { .. }));
    }

    #[test]
    fn duplicate_floor_rejected() {
        let map = OccupancyMap::from_rasters(1, 1, 1.0, vec![false], vec![true]).unwrap();
        let err = Building::from_maps("dup", [(3, map.clone()), (3, map)]).unwrap_err();
        assert_eq!(err, NavError::DuplicateFloor(3));
    }
}
