//! Dash and dot patterns.
//!
//! The pattern is a function of stroke width only, and the path is cut by arc
//! length, so a slow stroke with many points and a fast one with few points
//! over the same path come out with the same spacing.

use crate::drawing::LineTexture;
use kurbo::BezPath;

/// On/off lengths for a texture at the given stroke width. `None` for solid.
pub fn dash_pattern(texture: LineTexture, width: f64) -> Option<[f64; 2]> {
    let width = width.max(1.0);
    match texture {
        LineTexture::Solid => None,
        LineTexture::Dashed => Some([width * 3.0, width * 2.0]),
        LineTexture::Dotted => Some([width * 0.5, width * 2.0]),
    }
}

/// Cut a path into dash segments. Each dash becomes its own subpath.
pub fn dashed(path: &BezPath, pattern: &[f64; 2]) -> BezPath {
    BezPath::from_vec(kurbo::dash(path.iter(), 0.0, &pattern[..]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Point};

    /// Arc length of every subpath in a polyline path.
    fn dash_lengths(path: &BezPath) -> Vec<f64> {
        let mut lengths = Vec::new();
        let mut last = Point::ZERO;
        for el in path.elements() {
            match el {
                PathEl::MoveTo(p) => {
                    lengths.push(0.0);
                    last = *p;
                }
                PathEl::LineTo(p) => {
                    if let Some(len) = lengths.last_mut() {
                        *len += last.distance(*p);
                    }
                    last = *p;
                }
                _ => {}
            }
        }
        lengths
    }

    fn polyline(points: &[Point]) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(points[0]);
        for p in &points[1..] {
            path.line_to(*p);
        }
        path
    }

    #[test]
    fn test_solid_has_no_pattern() {
        assert!(dash_pattern(LineTexture::Solid, 5.0).is_none());
    }

    #[test]
    fn test_pattern_scales_with_width() {
        let thin = dash_pattern(LineTexture::Dashed, 2.0).unwrap();
        let thick = dash_pattern(LineTexture::Dashed, 6.0).unwrap();
        assert!((thick[0] / thin[0] - 3.0).abs() < 1e-9);
        assert!((thick[1] / thin[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_spacing_independent_of_point_density() {
        // Vertex spacing chosen so no dash boundary lands exactly on a vertex.
        let sparse = polyline(&[Point::new(0.0, 0.0), Point::new(101.0, 0.0)]);
        let dense_points: Vec<Point> = (0..=37)
            .map(|i| Point::new(f64::from(i) * 101.0 / 37.0, 0.0))
            .collect();
        let dense = polyline(&dense_points);

        for texture in [LineTexture::Dashed, LineTexture::Dotted] {
            let pattern = dash_pattern(texture, 4.0).unwrap();
            let a = dash_lengths(&dashed(&sparse, &pattern));
            let b = dash_lengths(&dashed(&dense, &pattern));
            assert_eq!(a.len(), b.len(), "{texture:?}");
            for (x, y) in a.iter().zip(&b) {
                assert!((x - y).abs() < 1e-6, "{texture:?}: {x} vs {y}");
            }
        }
    }

    #[test]
    fn test_full_dashes_have_pattern_length() {
        let path = polyline(&[Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(50.0, 50.0)]);
        let pattern = dash_pattern(LineTexture::Dashed, 4.0).unwrap();
        let lengths = dash_lengths(&dashed(&path, &pattern));
        // 100px of path with a 12 on / 8 off pattern: five dashes, all full,
        // one of them bending round the corner.
        assert_eq!(lengths.len(), 5);
        for len in lengths {
            assert!((len - pattern[0]).abs() < 1e-6, "dash of length {len}");
        }
    }
}
