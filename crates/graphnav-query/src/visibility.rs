//! Line-of-sight test over the wall raster.
//!
//! The straight segment between two pixels is sampled at `span + 1` evenly
//! spaced points, where `span = max(|Δrow|, |Δcol|)`.  Each sample is
//! truncated toward zero onto a pixel:
//!
//! ```text
//! frac = k / span            (0 when both pixels coincide)
//! row  = trunc(start.row + frac · Δrow)
//! col  = trunc(start.col + frac · Δcol)
//! ```
//!
//! This is sparser than a supercover traversal: on a diagonal step the
//! sampled pixel is the start-ward one and the neighbour sharing only a
//! corner is not visited.

use graphnav_map::OccupancyMap;
use graphnav_types::RasterCoord;

/// Pixels sampled on the way from `start` to `end`, both included.
pub fn sample_path(start: RasterCoord, end: RasterCoord) -> impl Iterator<Item = RasterCoord> {
    // Widened so any pair of i32 pixels has a representable delta.
    let d_row = i64::from(end.row) - i64::from(start.row);
    let d_col = i64::from(end.col) - i64::from(start.col);
    let span = d_row.unsigned_abs().max(d_col.unsigned_abs());

    (0..=span).map(move |k| {
        let frac = if span == 0 { 0.0 } else { k as f64 / span as f64 };
        RasterCoord::new(
            (f64::from(start.row) + frac * d_row as f64).trunc() as i32,
            (f64::from(start.col) + frac * d_col as f64).trunc() as i32,
        )
    })
}

/// First sampled pixel between `start` and `end` that is a wall, if any.
/// Pixels outside the map count as walls.
pub fn first_wall_on_path(
    map: &OccupancyMap,
    start: RasterCoord,
    end: RasterCoord,
) -> Option<RasterCoord> {
    sample_path(start, end).find(|&r| map.is_wall(r))
}

/// True when any sampled pixel between `start` and `end` (endpoints
/// included) is a wall.  Stops at the first wall found.
pub fn is_path_crossing_walls(map: &OccupancyMap, start: RasterCoord, end: RasterCoord) -> bool {
    first_wall_on_path(map, start, end).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10×10 map with the given wall pixels.
    fn map_with_walls(walls: &[(i32, i32)]) -> OccupancyMap {
        let mut cells = vec![false; 100];
        for &(r, c) in walls {
            cells[(r * 10 + c) as usize] = true;
        }
        OccupancyMap::from_rasters(10, 10, 1.0, cells, vec![true; 100]).unwrap()
    }

    #[test]
    fn coincident_points_sample_one_pixel() {
        let p = RasterCoord::new(4, 4);
        assert_eq!(sample_path(p, p).collect::<Vec<_>>(), vec![p]);
        assert!(!is_path_crossing_walls(&map_with_walls(&[]), p, p));
        assert!(is_path_crossing_walls(&map_with_walls(&[(4, 4)]), p, p));
    }

    #[test]
    fn samples_span_plus_one_points() {
        let samples: Vec<_> = sample_path(RasterCoord::new(0, 0), RasterCoord::new(3, 7)).collect();
        assert_eq!(samples.len(), 8);
        assert_eq!(samples.first(), Some(&RasterCoord::new(0, 0)));
        assert_eq!(samples.last(), Some(&RasterCoord::new(3, 7)));
    }

    #[test]
    fn interpolation_truncates_toward_start() {
        let samples: Vec<_> = sample_path(RasterCoord::new(0, 0), RasterCoord::new(2, 1)).collect();
        assert_eq!(
            samples,
            vec![
                RasterCoord::new(0, 0),
                RasterCoord::new(1, 0),
                RasterCoord::new(2, 1)
            ]
        );
    }

    #[test]
    fn reverse_direction_samples_endpoints() {
        let samples: Vec<_> = sample_path(RasterCoord::new(5, 8), RasterCoord::new(5, 2)).collect();
        assert_eq!(samples.len(), 7);
        assert!(samples.iter().all(|r| r.row == 5));
        assert_eq!(samples.last(), Some(&RasterCoord::new(5, 2)));
    }

    #[test]
    fn wall_in_the_middle_blocks() {
        let map = map_with_walls(&[(5, 5)]);
        assert!(is_path_crossing_walls(&map, RasterCoord::new(5, 1), RasterCoord::new(5, 8)));
        assert_eq!(
            first_wall_on_path(&map, RasterCoord::new(5, 1), RasterCoord::new(5, 8)),
            Some(RasterCoord::new(5, 5))
        );
        assert!(!is_path_crossing_walls(&map, RasterCoord::new(4, 1), RasterCoord::new(4, 8)));
    }

    #[test]
    fn wall_on_either_endpoint_blocks() {
        let map = map_with_walls(&[(2, 2), (7, 7)]);
        assert!(is_path_crossing_walls(&map, RasterCoord::new(2, 2), RasterCoord::new(2, 6)));
        assert!(is_path_crossing_walls(&map, RasterCoord::new(7, 3), RasterCoord::new(7, 7)));
    }

    #[test]
    fn diagonal_corner_neighbour_is_not_sampled() {
        // (1, 1) lies next to the segment but is never visited.
        let map = map_with_walls(&[(1, 1)]);
        assert!(!is_path_crossing_walls(&map, RasterCoord::new(0, 0), RasterCoord::new(2, 1)));
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let map = map_with_walls(&[]);
        let origin = RasterCoord::new(0, 0);
        let far = RasterCoord::new(i32::MIN, 0);
        assert!(is_path_crossing_walls(&map, origin, far));
        assert_eq!(first_wall_on_path(&map, origin, far), Some(RasterCoord::new(-1, 0)));

        let mut samples = sample_path(RasterCoord::new(i32::MAX, i32::MIN), RasterCoord::new(i32::MIN, i32::MAX));
        assert_eq!(samples.next(), Some(RasterCoord::new(i32::MAX, i32::MIN)));
        assert!(is_path_crossing_walls(
            &map,
            RasterCoord::new(i32::MAX, i32::MIN),
            RasterCoord::new(i32::MIN, i32::MAX)
        ));
    }

    #[test]
    fn leaving_the_map_counts_as_wall() {
        let map = map_with_walls(&[]);
        assert!(is_path_crossing_walls(&map, RasterCoord::new(5, 5), RasterCoord::new(5, 12)));
        assert!(is_path_crossing_walls(&map, RasterCoord::new(-1, 0), RasterCoord::new(-1, 0)));
    }
}
