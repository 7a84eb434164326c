//! Approximate segment-to-segment distance
//!
//! Uses four clamped point-to-segment projections (each endpoint against
//! the opposite segment) and takes the minimum. This captures the true
//! minimum whenever the closest approach is at or near an endpoint - the
//! common case for near-parallel plotter strokes - but understates
//! closeness for two segments that cross at an interior point with all
//! endpoints far away. That trade-off is deliberate; an exact
//! closed-form segment-segment distance could replace this function
//! without touching the rest of the scan.

use super::types::{Point, Segment};

/// Minimum distance from `p` to the segment `a`-`b`.
///
/// Projects onto the infinite line, clamps the parameter to [0, 1], and
/// measures to the clamped point. A zero-length segment reduces to
/// point-to-point distance.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let ab_x = b.x - a.x;
    let ab_y = b.y - a.y;
    let ap_x = p.x - a.x;
    let ap_y = p.y - a.y;

    let len_sq = ab_x * ab_x + ab_y * ab_y;
    if len_sq < 1e-10 {
        // Degenerate segment
        return (ap_x * ap_x + ap_y * ap_y).sqrt();
    }

    let t = ((ap_x * ab_x + ap_y * ab_y) / len_sq).clamp(0.0, 1.0);
    let dx = p.x - (a.x + t * ab_x);
    let dy = p.y - (a.y + t * ab_y);
    (dx * dx + dy * dy).sqrt()
}

/// Approximate minimum distance between two segments: the smallest of
/// the four endpoint-to-opposite-segment distances.
pub fn segment_distance(s1: &Segment, s2: &Segment) -> f32 {
    let d1 = point_segment_distance(s1.start, s2.start, s2.end);
    let d2 = point_segment_distance(s1.end, s2.start, s2.end);
    let d3 = point_segment_distance(s2.start, s1.start, s1.end);
    let d4 = point_segment_distance(s2.end, s1.start, s1.end);
    d1.min(d2).min(d3).min(d4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::types::SegmentKind;

    fn seg(owner: u64, x1: f32, y1: f32, x2: f32, y2: f32) -> Segment {
        Segment::new(
            SegmentKind::Line,
            owner as usize,
            owner,
            Point::new(x1, y1),
            Point::new(x2, y2),
        )
    }

    #[test]
    fn test_point_above_segment() {
        let d = point_segment_distance(Point::new(1.0, 1.0), Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_beyond_endpoint_clamps() {
        // Projection parameter would be > 1; distance measured to the endpoint
        let d = point_segment_distance(Point::new(5.0, 0.0), Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        assert!((d - 3.0).abs() < 1e-6);
        let d = point_segment_distance(Point::new(-3.0, 4.0), Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_length_segment_is_point_distance() {
        let d = point_segment_distance(Point::new(3.0, 4.0), Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert!((d - 5.0).abs() < 1e-6);

        let a = seg(0, 1.0, 1.0, 1.0, 1.0);
        let b = seg(1, 4.0, 5.0, 4.0, 5.0);
        assert!((segment_distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_parallel_segments() {
        let a = seg(0, 0.0, 0.0, 0.0, 10.0);
        let b = seg(1, 0.4, 0.0, 0.4, 10.0);
        assert!((segment_distance(&a, &b) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_offset_parallel_segments() {
        // b starts past the end of a; closest approach is corner to corner
        let a = seg(0, 0.0, 0.0, 10.0, 0.0);
        let b = seg(1, 13.0, 4.0, 20.0, 4.0);
        assert!((segment_distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_interior_crossing_is_understated() {
        // The two diagonals of a square cross at the center, so the true
        // minimum distance is 0, but every endpoint is far from the
        // opposite segment. The 4-point approximation reports the
        // endpoint distance instead.
        let a = seg(0, -10.0, -10.0, 10.0, 10.0);
        let b = seg(1, -10.0, 10.0, 10.0, -10.0);
        let d = segment_distance(&a, &b);
        assert!((d - 200.0_f32.sqrt()).abs() < 1e-3);
    }
}
