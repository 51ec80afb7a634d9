//! Infinite-line intersection of two clicked segments.
//!
//! The clicked segments are treated as infinite lines: the virtual point
//! being recovered (typically a corner occluded in the frame) usually lies
//! outside both clicked spans, so no endpoint bounding is applied.

use crate::types::{LineSegment, Point2D};

/// Denominator threshold below which the lines are considered parallel or
/// coincident. The sole degeneracy guard; no other conditioning is applied.
const DENOM_EPS: f64 = 1e-6;

/// Intersect the infinite lines through segments AB and CD.
///
/// All four points must be in the same coordinate space (source space, by
/// workflow convention). Returns `None` when the lines are parallel or
/// coincident; the caller must surface that and re-collect rather than
/// substitute a fallback point.
pub fn segment_intersection(a: Point2D, b: Point2D, c: Point2D, d: Point2D) -> Option<Point2D> {
    let denom = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);
    if denom.abs() < DENOM_EPS {
        return None;
    }
    let ua = ((d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x)) / denom;
    Some(Point2D::new(
        a.x + ua * (b.x - a.x),
        a.y + ua * (b.y - a.y),
    ))
}

/// [`segment_intersection`] over segment values.
pub fn line_intersection(ab: &LineSegment, cd: &LineSegment) -> Option<Point2D> {
    segment_intersection(ab.p0, ab.p1, cd.p0, cd.p1)
}
