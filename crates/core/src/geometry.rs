//! Surface geometry for the markup overlay
//!
//! All coordinates are surface-local pixels: origin at the top-left corner of
//! the rendered page surface, X increasing to the right, Y increasing downward.

use serde::{Deserialize, Serialize};

/// A point on the rendered page surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub x: f32,
    pub y: f32,
}

impl SurfacePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset the point by the given deltas
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Axis-aligned rectangle with non-negative extent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Zero-size rectangle anchored at a point
    pub fn at(point: SurfacePoint) -> Self {
        Self { x: point.x, y: point.y, width: 0.0, height: 0.0 }
    }

    /// Inclusive containment test
    pub fn contains(&self, point: SurfacePoint) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// True when both width and height are strictly greater than `min`
    pub fn exceeds(&self, min: f32) -> bool {
        self.width > min && self.height > min
    }
}

/// Normalize a drag gesture into a rectangle regardless of drag direction.
///
/// The origin is the component-wise minimum of the two points and the extent
/// is the absolute difference, so a drag from (100, 100) to (40, 160) yields
/// `{ x: 40, y: 100, width: 60, height: 60 }`.
pub fn normalize_drag(start: SurfacePoint, current: SurfacePoint) -> Rect {
    Rect {
        x: start.x.min(current.x),
        y: start.y.min(current.y),
        width: (current.x - start.x).abs(),
        height: (current.y - start.y).abs(),
    }
}

/// Bounding rectangle of the rendered page surface in host (client) space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceBounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Map a client-space pointer position into surface-local coordinates
    pub fn to_local(&self, client: SurfacePoint) -> SurfacePoint {
        SurfacePoint { x: client.x - self.left, y: client.y - self.top }
    }

    /// Whether a surface-local point lies on the surface
    pub fn contains_local(&self, local: SurfacePoint) -> bool {
        Rect::new(0.0, 0.0, self.width, self.height).contains(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> SurfacePoint {
        SurfacePoint::new(x, y)
    }

    #[test]
    fn test_normalize_drag_down_right() {
        assert_eq!(normalize_drag(p(10.0, 20.0), p(70.0, 50.0)), Rect::new(10.0, 20.0, 60.0, 30.0));
    }

    #[test]
    fn test_normalize_drag_down_left() {
        assert_eq!(
            normalize_drag(p(100.0, 100.0), p(40.0, 160.0)),
            Rect::new(40.0, 100.0, 60.0, 60.0)
        );
    }

    #[test]
    fn test_normalize_drag_up_right() {
        assert_eq!(normalize_drag(p(10.0, 90.0), p(30.0, 50.0)), Rect::new(10.0, 50.0, 20.0, 40.0));
    }

    #[test]
    fn test_normalize_drag_up_left() {
        assert_eq!(normalize_drag(p(80.0, 80.0), p(20.0, 30.0)), Rect::new(20.0, 30.0, 60.0, 50.0));
    }

    #[test]
    fn test_exceeds_is_strict_on_both_axes() {
        assert!(!Rect::new(0.0, 0.0, 5.0, 100.0).exceeds(5.0));
        assert!(!Rect::new(0.0, 0.0, 100.0, 3.0).exceeds(5.0));
        assert!(Rect::new(0.0, 0.0, 5.5, 6.0).exceeds(5.0));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(p(10.0, 10.0)));
        assert!(rect.contains(p(30.0, 30.0)));
        assert!(!rect.contains(p(30.1, 15.0)));
    }

    #[test]
    fn test_to_local_subtracts_origin() {
        let bounds = SurfaceBounds::new(50.0, 120.0, 800.0, 1000.0);
        let local = bounds.to_local(p(75.0, 130.0));
        assert_eq!(local, p(25.0, 10.0));
        assert!(bounds.contains_local(local));
        assert!(!bounds.contains_local(p(-1.0, 0.0)));
    }
}
