//! Stamped symbol glyphs.
//!
//! Every glyph fits the square given by its size class. Outline widths are a
//! fixed fraction of that square, not the tool's line width.

use super::Paint;
use crate::drawing::{SymbolGeometry, SymbolType};
use kurbo::{Affine, BezPath, Cap, Circle, Line, Point, Rect, RoundedRect, Shape, Stroke};
use peniko::Color;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Outline width as a fraction of the symbol side.
pub const OUTLINE_RATIO: f64 = 0.3;
/// Inset from the bounding square as a fraction of the side.
pub const PADDING_RATIO: f64 = 0.1;
/// How far the arrow's trailing edge is pulled toward the tip, as a fraction
/// of the available width.
pub const ARROW_NOTCH_RATIO: f64 = 0.25;
/// Rounded-square corner radius as a fraction of the side.
pub const CORNER_RATIO: f64 = 0.2;

const TOLERANCE: f64 = 0.1;

/// Paths and paints for one symbol, main pass only.
pub fn glyph(symbol: &SymbolGeometry, color: Color) -> Vec<(BezPath, Paint)> {
    let side = symbol.size().side();
    let center = symbol.at();
    let padding = side * PADDING_RATIO;
    let half = side / 2.0 - padding;

    match symbol.symbol() {
        SymbolType::Plus => plus(center, half, side, color, Affine::IDENTITY),
        SymbolType::Cross => plus(center, half, side, color, Affine::rotate_about(FRAC_PI_4, center)),
        SymbolType::Dot => vec![(Circle::new(center, half).to_path(TOLERANCE), Paint::Fill { color })],
        SymbolType::RoundedSquare => {
            let rect = Rect::new(center.x - half, center.y - half, center.x + half, center.y + half);
            let path = RoundedRect::from_rect(rect, side * CORNER_RATIO).to_path(TOLERANCE);
            vec![(path, Paint::Fill { color })]
        }
        arrow => {
            let turns = arrow.quarter_turns().unwrap_or(0);
            vec![(arrow_polygon(center, side, turns), Paint::Fill { color })]
        }
    }
}

fn plus(center: Point, half: f64, side: f64, color: Color, transform: Affine) -> Vec<(BezPath, Paint)> {
    let style = Stroke::new(side * OUTLINE_RATIO).with_caps(Cap::Butt);
    let horizontal = Line::new((center.x - half, center.y), (center.x + half, center.y));
    let vertical = Line::new((center.x, center.y - half), (center.x, center.y + half));

    [horizontal, vertical]
        .into_iter()
        .map(|line| {
            let mut path = line.to_path(TOLERANCE);
            path.apply_affine(transform);
            (
                path,
                Paint::Stroke {
                    style: style.clone(),
                    color,
                },
            )
        })
        .collect()
}

/// Notched chevron pointing up, rotated clockwise by `quarter_turns`.
///
/// Four points: the tip, the two trailing corners, and the notch between
/// them pulled toward the tip.
pub fn arrow_polygon(center: Point, side: f64, quarter_turns: u8) -> BezPath {
    let available = side * (1.0 - 2.0 * PADDING_RATIO);
    let h = available / 2.0;
    let notch = h - available * ARROW_NOTCH_RATIO;

    let mut path = BezPath::new();
    path.move_to((center.x, center.y - h));
    path.line_to((center.x + h, center.y + h));
    path.line_to((center.x, center.y + notch));
    path.line_to((center.x - h, center.y + h));
    path.close_path();

    if quarter_turns % 4 != 0 {
        let angle = f64::from(quarter_turns % 4) * FRAC_PI_2;
        path.apply_affine(Affine::rotate_about(angle, center));
    }
    path
}
