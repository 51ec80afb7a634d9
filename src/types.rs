use serde::{Deserialize, Serialize};

/// Number of corner slots in a completed calibration result.
pub const POINT_COUNT: usize = 4;

/// 2D pixel coordinate.
///
/// Two coordinate spaces exist: *display space* (the scaled-down preview the
/// operator clicks on) and *source space* (the full-resolution undistorted
/// frame). Every point stored in a [`PointSet`] is in source space; the
/// conversion happens the moment a click is accepted, see
/// [`crate::display::DisplayScale`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered pair of endpoints, both in the same coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LineSegment {
    pub p0: Point2D,
    pub p1: Point2D,
}

impl LineSegment {
    pub fn new(p0: Point2D, p1: Point2D) -> Self {
        Self { p0, p1 }
    }
}

/// Four ordered corner slots, each unfilled or holding a source-space point.
///
/// Slot index is the semantic corner ordering assigned by the acquisition
/// workflow, not a spatial order. Downstream consumers depend on slot
/// identity (slot 0 = designated corner 1), so slots are only ever filled,
/// never reordered.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PointSet {
    slots: [Option<Point2D>; POINT_COUNT],
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `slot` with a source-space point. Panics on an out-of-range slot;
    /// callers resolve operator input to a valid index first.
    pub fn fill(&mut self, slot: usize, point: Point2D) {
        self.slots[slot] = Some(point);
    }

    pub fn get(&self, slot: usize) -> Option<Point2D> {
        self.slots.get(slot).copied().flatten()
    }

    /// Lowest-numbered empty slot, if any. Phase-2 clicks are assigned in
    /// this ascending order regardless of operator intent.
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn slots(&self) -> &[Option<Point2D>; POINT_COUNT] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_empty_is_ascending() {
        let mut set = PointSet::new();
        assert_eq!(set.first_empty(), Some(0));
        set.fill(1, Point2D::new(1.0, 1.0));
        assert_eq!(set.first_empty(), Some(0));
        set.fill(0, Point2D::new(0.0, 0.0));
        assert_eq!(set.first_empty(), Some(2));
        set.fill(2, Point2D::new(2.0, 2.0));
        set.fill(3, Point2D::new(3.0, 3.0));
        assert_eq!(set.first_empty(), None);
        assert!(set.is_complete());
    }

    #[test]
    fn filled_count_tracks_fills() {
        let mut set = PointSet::new();
        assert_eq!(set.filled_count(), 0);
        set.fill(3, Point2D::new(4.0, 5.0));
        assert_eq!(set.filled_count(), 1);
        assert_eq!(set.get(3), Some(Point2D::new(4.0, 5.0)));
        assert_eq!(set.get(0), None);
    }
}
