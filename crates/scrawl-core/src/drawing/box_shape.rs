//! Two-corner box geometry.

use super::RecordError;
use kurbo::{Point, Rect};
use serde::Serialize;

/// A rectangle spanned by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxGeometry {
    from: Point,
    to: Point,
}

impl BoxGeometry {
    /// Identical corners count as a single point and are rejected.
    pub fn new(from: Point, to: Point) -> Result<Self, RecordError> {
        if !from.is_finite() || !to.is_finite() {
            return Err(RecordError::NonFinite);
        }
        if from == to {
            return Err(RecordError::TooFewPoints(1));
        }
        let size = Rect::from_points(from, to).size();
        if !size.width.is_finite() || !size.height.is_finite() {
            return Err(RecordError::NonFinite);
        }
        Ok(Self { from, to })
    }

    /// Corner where the drag started.
    pub fn start(&self) -> Point {
        self.from
    }

    /// Corner where the drag ended.
    pub fn end(&self) -> Point {
        self.to
    }

    /// Normalized rectangle, regardless of drag direction.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalized() {
        let b = BoxGeometry::new(Point::new(50.0, 60.0), Point::new(10.0, 20.0)).unwrap();
        assert_eq!(b.rect(), Rect::new(10.0, 20.0, 50.0, 60.0));
    }

    #[test]
    fn test_identical_corners_rejected() {
        let p = Point::new(1.0, 1.0);
        assert_eq!(BoxGeometry::new(p, p), Err(RecordError::TooFewPoints(1)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let result = BoxGeometry::new(Point::ZERO, Point::new(f64::NAN, 1.0));
        assert_eq!(result, Err(RecordError::NonFinite));
    }

    #[test]
    fn test_overflowing_span_rejected() {
        let result = BoxGeometry::new(Point::new(-1e308, 0.0), Point::new(1e308, 1.0));
        assert_eq!(result, Err(RecordError::NonFinite));
    }
}
