//! Per-floor Occupancy Map.
//!
//! Holds two binary rasters of identical size (walls and walkable area) and
//! the affine transform between metric ("UV") coordinates and raster
//! indices.  Metric space has its origin at the bottom-left of the floor
//! plan; raster space has its origin at the top-left pixel, so the row axis
//! is flipped:
//!
//! ```text
//! row = height − scale · y        x = col / scale
//! col = scale · x                 y = (height − row) / scale
//! ```
//!
//! # Example
//!
//! ```rust
//! use graphnav_map::OccupancyMap;
//! use graphnav_types::{MetricPoint, RasterCoord};
//!
//! // 10×10 pixel floor, 2 pixels per metre, wall in the top-left pixel.
//! let mut walls = vec![false; 100];
//! walls[0] = true;
//! let map = OccupancyMap::from_rasters(10, 10, 2.0, walls, vec![true; 100]).unwrap();
//!
//! let r = map.metric_to_raster(MetricPoint::new(1.0, 1.0)).unwrap();
//! assert_eq!(r, RasterCoord::new(8, 2));
//! assert!(map.is_wall(RasterCoord::new(0, 0)));
//! assert!(map.is_wall(RasterCoord::new(-1, 3))); // outside counts as wall
//! ```

use graphnav_types::{MetricPoint, NavError, RasterCoord};
use image::GrayImage;

/// Binary wall / walkable rasters for one floor plus the metric transform.
///
/// Immutable once built; share it by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyMap {
    width: u32,
    height: u32,
    /// Pixels per metric unit.
    scale: f32,
    /// Row-major, `true` = wall pixel.
    walls: Vec<bool>,
    /// Row-major, `true` = traversable pixel.
    walkable: Vec<bool>,
}

impl OccupancyMap {
    /// Build a map from two row-major rasters of `width × height` cells.
    ///
    /// # Errors
    ///
    /// - [`NavError::InvalidScale`] when `scale` is not a positive finite number.
    /// - [`NavError::DimensionMismatch`] when a raster does not hold exactly
    ///   `width × height` cells.
    pub fn from_rasters(
        width: u32,
        height: u32,
        scale: f32,
        walls: Vec<bool>,
        walkable: Vec<bool>,
    ) -> Result<Self, NavError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(NavError::InvalidScale(scale));
        }
        let expected = width as usize * height as usize;
        for (what, raster) in [("wall raster", &walls), ("walkable raster", &walkable)] {
            if raster.len() != expected {
                return Err(NavError::DimensionMismatch {
                    what: what.to_string(),
                    expected,
                    found: raster.len(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            scale,
            walls,
            walkable,
        })
    }

    /// Build a map from grayscale floor-plan images.  Any non-zero pixel is
    /// set (a wall in `walls`, traversable in `walkable`).
    ///
    /// # Errors
    ///
    /// [`NavError::RasterSizeMismatch`] when the two images differ in size,
    /// [`NavError::InvalidScale`] for a non-positive scale.
    pub fn from_gray_images(
        walls: &GrayImage,
        walkable: &GrayImage,
        scale: f32,
    ) -> Result<Self, NavError> {
        if walls.dimensions() != walkable.dimensions() {
            return Err(NavError::RasterSizeMismatch {
                walls: walls.dimensions(),
                walkable: walkable.dimensions(),
            });
        }
        let (width, height) = walls.dimensions();
        // GrayImage pixels are stored row-major, matching our layout.
        let wall_cells = walls.pixels().map(|p| p.0[0] > 0).collect();
        let walk_cells = walkable.pixels().map(|p| p.0[0] > 0).collect();
        Self::from_rasters(width, height, scale, wall_cells, walk_cells)
    }

    /// Raster width in pixels (number of columns).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels (number of rows).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels per metric unit.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// `(width, height)` in pixels.
    pub fn size_pixels(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `(width, height)` of the floor in metric units.
    pub fn size_metric(&self) -> (f32, f32) {
        (
            self.width as f32 / self.scale,
            self.height as f32 / self.scale,
        )
    }

    /// True when `r` indexes a pixel of the raster.
    pub fn contains(&self, r: RasterCoord) -> bool {
        r.row >= 0 && r.col >= 0 && (r.row as u32) < self.height && (r.col as u32) < self.width
    }

    /// Convert a metric point to the raster pixel containing it.
    ///
    /// Indices are truncated toward zero, so a point up to one pixel
    /// beyond the left or top edge (a fractional index in `(-1, 0)`) lands
    /// on column or row 0 and is accepted.  Points further out, or at or
    /// past the right or bottom edge, are rejected.
    ///
    /// # Errors
    ///
    /// [`NavError::OutOfRange`] when the pixel lies outside the raster.
    /// Callers treat this as "outside the map", never as a crash.
    pub fn metric_to_raster(&self, p: MetricPoint) -> Result<RasterCoord, NavError> {
        let row = (self.height as f32 - self.scale * p.y).trunc();
        let col = (self.scale * p.x).trunc();
        // Non-finite inputs would saturate into a bogus in-range index.
        let out_of_range = |row: i32, col: i32| NavError::OutOfRange {
            row,
            col,
            width: self.width,
            height: self.height,
        };
        if !row.is_finite() || !col.is_finite() {
            return Err(out_of_range(i32::MIN, i32::MIN));
        }
        let r = RasterCoord::new(row as i32, col as i32);
        if self.contains(r) {
            Ok(r)
        } else {
            Err(out_of_range(r.row, r.col))
        }
    }

    /// Convert a raster index to metric space.  Defined for any index,
    /// including ones outside the raster.
    pub fn raster_to_metric(&self, r: RasterCoord) -> MetricPoint {
        MetricPoint::new(
            r.col as f32 / self.scale,
            (self.height as f32 - r.row as f32) / self.scale,
        )
    }

    /// True when `r` is a wall pixel.  Anything outside the raster is
    /// treated as a wall: unseen space blocks sight lines.
    pub fn is_wall(&self, r: RasterCoord) -> bool {
        match self.index(r) {
            Some(i) => self.walls[i],
            None => true,
        }
    }

    /// True when `r` is traversable.  Anything outside the raster is not.
    pub fn is_walkable(&self, r: RasterCoord) -> bool {
        match self.index(r) {
            Some(i) => self.walkable[i],
            None => false,
        }
    }

    /// Number of wall pixels, used in load summaries.
    pub fn wall_pixel_count(&self) -> usize {
        self.walls.iter().filter(|w| **w).count()
    }

    fn index(&self, r: RasterCoord) -> Option<usize> {
        self.contains(r)
            .then(|| r.row as usize * self.width as usize + r.col as usize)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
