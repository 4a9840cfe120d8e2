//! Point-to-segment projection.

use graphnav_types::MetricPoint;

/// Closest point to `pt` on the segment `p1`–`p2`.
///
/// Uses the scalar projection `t = ((pt − p1) · (p2 − p1)) / |p2 − p1|²`
/// clamped to `[0, 1]`.  A zero-length segment returns `p1`.
pub fn project_onto_segment(p1: MetricPoint, p2: MetricPoint, pt: MetricPoint) -> MetricPoint {
    let diff = p2 - p1;
    let len_sq = diff.norm_squared();
    if len_sq == 0.0 {
        return p1;
    }
    let t = (pt - p1).dot(diff) / len_sq;
    if t < 0.0 {
        p1
    } else if t > 1.0 {
        p2
    } else {
        p1 + diff * t
    }
}
