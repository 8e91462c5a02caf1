//! Geometry primitives for the collision core
//!
//! Points are plain `DVec2` values. Lines are directed segments and rectangles
//! are axis-aligned boxes in screen space (y grows downward).

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::EPSILON;

/// A point in screen space
pub type Point = DVec2;

/// Relative tolerance under which two directions count as parallel
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// Invariant violations caught when building shapes and entities
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("rectangle dimensions must be finite and non-negative (width {width}, height {height})")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("ball radius must be positive")]
    ZeroRadius,

    #[error("paddle width must be positive, got {0}")]
    InvalidPaddleWidth(f64),

    #[error("speed must be finite and non-negative, got {0}")]
    InvalidSpeed(f64),

    #[error("travel bounds [{min}, {max}] cannot hold a paddle of width {width}")]
    InvalidTravelBounds { min: f64, max: f64, width: f64 },
}

/// A directed line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Displacement from start to end
    #[inline]
    pub fn direction(&self) -> DVec2 {
        self.end - self.start
    }

    /// True when start and end coincide
    pub fn is_degenerate(&self) -> bool {
        self.direction().length_squared() == 0.0
    }

    /// Check whether a point lies inside the segment's bounding box, widened by EPSILON
    fn bounds_contain(&self, p: Point) -> bool {
        within(p.x, self.start.x, self.end.x) && within(p.y, self.start.y, self.end.y)
    }

    /// Check whether `p` lies on this segment (within EPSILON)
    pub fn contains_point(&self, p: Point) -> bool {
        let dir = self.direction();
        if self.is_degenerate() {
            return self.start.distance(p) <= EPSILON;
        }
        // Distance from p to the infinite line, scaled by the segment length
        let off_line = dir.perp_dot(p - self.start).abs();
        off_line <= EPSILON * dir.length() && self.bounds_contain(p)
    }

    /// The single point where two segments cross, if they do
    ///
    /// Parallel and collinear segments never intersect here, even when they
    /// overlap. The point is evaluated on `other`'s parametrisation, so an
    /// axis-aligned `other` yields its exact constant coordinate.
    pub fn intersection_with(&self, other: &Line) -> Option<Point> {
        let r = self.direction();
        let s = other.direction();
        let denom = r.perp_dot(s);

        // Covers zero-length segments too (denom and the bound are both 0)
        if denom.abs() <= PARALLEL_TOLERANCE * r.length() * s.length() {
            return None;
        }

        let u = (other.start - self.start).perp_dot(r) / denom;
        let point = other.start + s * u;

        if self.bounds_contain(point) && other.bounds_contain(point) {
            Some(point)
        } else {
            None
        }
    }

    /// Check whether two segments cross at a single point
    pub fn is_intersecting(&self, other: &Line) -> bool {
        self.intersection_with(other).is_some()
    }

    /// Of the points where this segment meets `rect`, the one closest to `self.start`
    pub fn closest_intersection_to_start(&self, rect: &Rectangle) -> Option<Point> {
        let mut closest: Option<(Point, f64)> = None;
        for point in rect.intersection_points(self) {
            let dist = self.start.distance(point);
            if closest.is_none_or(|(_, best)| dist < best) {
                closest = Some((point, dist));
            }
        }
        closest.map(|(point, _)| point)
    }
}

/// Check `v` against the closed range spanned by `a` and `b`, widened by EPSILON
#[inline]
fn within(v: f64, a: f64, b: f64) -> bool {
    v >= a.min(b) - EPSILON && v <= a.max(b) + EPSILON
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    upper_left: Point,
    width: f64,
    height: f64,
}

impl Rectangle {
    pub fn new(upper_left: Point, width: f64, height: f64) -> Result<Self, ShapeError> {
        // Negated comparison also rejects NaN
        if !(width >= 0.0 && height >= 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(ShapeError::InvalidDimensions { width, height });
        }
        Ok(Self {
            upper_left,
            width,
            height,
        })
    }

    pub fn from_coords(x: f64, y: f64, width: f64, height: f64) -> Result<Self, ShapeError> {
        Self::new(Point::new(x, y), width, height)
    }

    #[inline]
    pub fn upper_left(&self) -> Point {
        self.upper_left
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn down_right(&self) -> Point {
        self.upper_left + Point::new(self.width, self.height)
    }

    pub fn left(&self) -> f64 {
        self.upper_left.x
    }

    pub fn right(&self) -> f64 {
        self.upper_left.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.upper_left.y
    }

    pub fn bottom(&self) -> f64 {
        self.upper_left.y + self.height
    }

    pub fn center(&self) -> Point {
        self.upper_left + Point::new(self.width, self.height) * 0.5
    }

    /// Same size, moved to a new upper-left corner
    pub fn with_upper_left(&self, upper_left: Point) -> Self {
        Self { upper_left, ..*self }
    }

    pub fn top_edge(&self) -> Line {
        Line::from_coords(self.left(), self.top(), self.right(), self.top())
    }

    pub fn bottom_edge(&self) -> Line {
        Line::from_coords(self.left(), self.bottom(), self.right(), self.bottom())
    }

    pub fn left_edge(&self) -> Line {
        Line::from_coords(self.left(), self.top(), self.left(), self.bottom())
    }

    pub fn right_edge(&self) -> Line {
        Line::from_coords(self.right(), self.top(), self.right(), self.bottom())
    }

    /// Boundary segments in top, bottom, left, right order
    pub fn edges(&self) -> [Line; 4] {
        [
            self.top_edge(),
            self.bottom_edge(),
            self.left_edge(),
            self.right_edge(),
        ]
    }

    /// A rectangle with no area never reports intersections
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Points where `line` crosses this rectangle's boundary, in edge order
    ///
    /// A line through a corner can report the corner once per touching edge.
    pub fn intersection_points(&self, line: &Line) -> Vec<Point> {
        if self.is_degenerate() {
            return Vec::new();
        }
        self.edges()
            .iter()
            .filter_map(|edge| line.intersection_with(edge))
            .collect()
    }

    /// True when `p` is inside the rectangle and not on its boundary
    pub fn contains_strictly(&self, p: Point) -> bool {
        p.x > self.left() && p.x < self.right() && p.y > self.top() && p.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
        Rectangle::from_coords(x, y, w, h).unwrap()
    }

    #[test]
    fn test_crossing_segments() {
        let a = Line::from_coords(0.0, 0.0, 10.0, 10.0);
        let b = Line::from_coords(0.0, 10.0, 10.0, 0.0);
        let p = a.intersection_with(&b).unwrap();
        assert!((p.x - 5.0).abs() < 1e-9);
        assert!((p.y - 5.0).abs() < 1e-9);
        assert!(a.is_intersecting(&b));
    }

    #[test]
    fn test_non_crossing_segments() {
        let a = Line::from_coords(0.0, 0.0, 1.0, 1.0);
        let b = Line::from_coords(5.0, 0.0, 6.0, -3.0);
        assert!(a.intersection_with(&b).is_none());
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        let a = Line::from_coords(0.0, 0.0, 10.0, 0.0);
        let b = Line::from_coords(0.0, 5.0, 10.0, 5.0);
        assert!(a.intersection_with(&b).is_none());

        // Collinear and overlapping is still "no intersection"
        let c = Line::from_coords(5.0, 0.0, 15.0, 0.0);
        assert!(a.intersection_with(&c).is_none());
    }

    #[test]
    fn test_degenerate_segment() {
        let dot = Line::from_coords(3.0, 3.0, 3.0, 3.0);
        let b = Line::from_coords(0.0, 3.0, 10.0, 3.0);
        assert!(dot.is_degenerate());
        assert!(dot.intersection_with(&b).is_none());
        assert!(b.intersection_with(&dot).is_none());
    }

    #[test]
    fn test_touching_endpoints() {
        let a = Line::from_coords(0.0, 0.0, 5.0, 5.0);
        let b = Line::from_coords(5.0, 5.0, 10.0, 0.0);
        let p = a.intersection_with(&b).unwrap();
        assert!(p.distance(Point::new(5.0, 5.0)) < 1e-9);
    }

    #[test]
    fn test_intersection_snaps_to_axis_aligned_other() {
        let trajectory = Line::from_coords(401.3, 299.7, 402.9, 307.1);
        let edge = Line::from_coords(390.0, 305.0, 410.0, 305.0);
        let p = trajectory.intersection_with(&edge).unwrap();
        assert_eq!(p.y, 305.0);
    }

    #[test]
    fn test_contains_point() {
        let line = Line::from_coords(0.0, 0.0, 10.0, 0.0);
        assert!(line.contains_point(Point::new(5.0, 0.0)));
        assert!(line.contains_point(Point::new(10.0005, 0.0)));
        assert!(!line.contains_point(Point::new(11.0, 0.0)));
        assert!(!line.contains_point(Point::new(5.0, 1.0)));
    }

    #[test]
    fn test_rectangle_rejects_negative_dimensions() {
        assert!(Rectangle::from_coords(0.0, 0.0, -1.0, 5.0).is_err());
        assert!(Rectangle::from_coords(0.0, 0.0, 5.0, f64::NAN).is_err());
        assert!(Rectangle::from_coords(0.0, 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_rectangle_edges_and_corners() {
        let r = rect(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.upper_left(), Point::new(10.0, 20.0));
        assert_eq!((r.width(), r.height()), (30.0, 40.0));
        assert_eq!(r.down_right(), Point::new(40.0, 60.0));
        assert_eq!(r.top_edge(), Line::from_coords(10.0, 20.0, 40.0, 20.0));
        assert_eq!(r.bottom_edge(), Line::from_coords(10.0, 60.0, 40.0, 60.0));
        assert_eq!(r.left_edge(), Line::from_coords(10.0, 20.0, 10.0, 60.0));
        assert_eq!(r.right_edge(), Line::from_coords(40.0, 20.0, 40.0, 60.0));
        assert_eq!(r.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_rectangle_intersections() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        let through = Line::from_coords(-5.0, 5.0, 15.0, 5.0);
        let points = r.intersection_points(&through);
        assert_eq!(points.len(), 2);
        assert_eq!(through.closest_intersection_to_start(&r), Some(Point::new(0.0, 5.0)));

        let outside = Line::from_coords(-5.0, -5.0, -1.0, 20.0);
        assert!(r.intersection_points(&outside).is_empty());
        assert!(outside.closest_intersection_to_start(&r).is_none());
    }

    #[test]
    fn test_degenerate_rectangle_has_no_intersections() {
        let r = rect(0.0, 0.0, 0.0, 10.0);
        let line = Line::from_coords(-5.0, 5.0, 5.0, 5.0);
        assert!(r.intersection_points(&line).is_empty());
    }

    #[test]
    fn test_contains_strictly() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_strictly(Point::new(5.0, 5.0)));
        assert!(!r.contains_strictly(Point::new(0.0, 5.0)));
        assert!(!r.contains_strictly(Point::new(5.0, 10.0)));
        assert!(!r.contains_strictly(Point::new(11.0, 5.0)));
    }

    proptest! {
        #[test]
        fn prop_intersection_lies_on_both_segments(
            x1 in -500.0..500.0f64, y1 in -500.0..500.0f64,
            x2 in -500.0..500.0f64, y2 in -500.0..500.0f64,
            x3 in -500.0..500.0f64, y3 in -500.0..500.0f64,
            x4 in -500.0..500.0f64, y4 in -500.0..500.0f64,
        ) {
            let a = Line::from_coords(x1, y1, x2, y2);
            let b = Line::from_coords(x3, y3, x4, y4);
            if let Some(p) = a.intersection_with(&b) {
                prop_assert!(a.contains_point(p));
                prop_assert!(b.contains_point(p));
            }
        }

        #[test]
        fn prop_rectangle_hit_is_on_boundary_and_trajectory(
            sx in -100.0..300.0f64, sy in -100.0..300.0f64,
            ex in -100.0..300.0f64, ey in -100.0..300.0f64,
        ) {
            let r = rect(50.0, 60.0, 120.0, 40.0);
            let trajectory = Line::from_coords(sx, sy, ex, ey);
            if let Some(p) = trajectory.closest_intersection_to_start(&r) {
                prop_assert!(trajectory.contains_point(p));
                prop_assert!(r.edges().iter().any(|edge| edge.contains_point(p)));
            }
        }
    }
}
