//! Freehand stroke geometry.

use super::RecordError;
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::Serialize;

/// A polyline stored as an anchor plus offsets relative to it.
///
/// The first offset is always the origin, so the anchor is also the first
/// point of the path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeGeometry {
    anchor: Point,
    points: Vec<Vec2>,
}

impl StrokeGeometry {
    pub fn new(anchor: Point, points: Vec<Vec2>) -> Result<Self, RecordError> {
        if points.len() < 2 {
            return Err(RecordError::TooFewPoints(points.len()));
        }
        if !anchor.is_finite() || points.iter().any(|p| !p.is_finite()) {
            return Err(RecordError::NonFinite);
        }
        if points[0] != Vec2::ZERO {
            return Err(RecordError::MisplacedOrigin);
        }
        // Finite parts can still overflow once added together.
        if points.iter().any(|p| !(anchor + *p).is_finite()) {
            return Err(RecordError::NonFinite);
        }
        Ok(Self { anchor, points })
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Offsets relative to the anchor.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in world coordinates.
    pub fn absolute_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(move |offset| self.anchor + *offset)
    }

    /// Total length of the polyline.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).hypot()).sum()
    }

    pub fn bounds(&self) -> Rect {
        let mut points = self.absolute_points();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }

    /// Connected path through all points.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.absolute_points();
        if let Some(first) = points.next() {
            path.move_to(first);
            for point in points {
                path.line_to(point);
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_single_point() {
        let result = StrokeGeometry::new(Point::ZERO, vec![Vec2::ZERO]);
        assert_eq!(result, Err(RecordError::TooFewPoints(1)));
    }

    #[test]
    fn test_rejects_non_finite() {
        let result = StrokeGeometry::new(Point::new(f64::NAN, 0.0), vec![Vec2::ZERO, Vec2::new(1.0, 1.0)]);
        assert_eq!(result, Err(RecordError::NonFinite));
        let result = StrokeGeometry::new(Point::ZERO, vec![Vec2::ZERO, Vec2::new(f64::INFINITY, 1.0)]);
        assert_eq!(result, Err(RecordError::NonFinite));
    }

    #[test]
    fn test_rejects_overflowing_sum() {
        let result = StrokeGeometry::new(Point::new(1e308, 0.0), vec![Vec2::ZERO, Vec2::new(1e308, 0.0)]);
        assert_eq!(result, Err(RecordError::NonFinite));
    }

    #[test]
    fn test_first_point_must_be_origin() {
        let result = StrokeGeometry::new(Point::ZERO, vec![Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)]);
        assert_eq!(result, Err(RecordError::MisplacedOrigin));
    }

    #[test]
    fn test_bounds_and_length() {
        let stroke = StrokeGeometry::new(
            Point::new(10.0, 10.0),
            vec![Vec2::ZERO, Vec2::new(30.0, 0.0), Vec2::new(30.0, 40.0)],
        )
        .unwrap();

        let bounds = stroke.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 50.0).abs() < f64::EPSILON);
        assert!((stroke.length() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_starts_at_anchor() {
        let stroke = StrokeGeometry::new(Point::new(3.0, 4.0), vec![Vec2::ZERO, Vec2::new(1.0, 1.0)]).unwrap();
        let path = stroke.to_path();
        assert_eq!(path.elements().len(), 2);
        assert_eq!(path.elements()[0], kurbo::PathEl::MoveTo(Point::new(3.0, 4.0)));
        assert_eq!(path.elements()[1], kurbo::PathEl::LineTo(Point::new(4.0, 5.0)));
    }
}
