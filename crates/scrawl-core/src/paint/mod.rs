//! Geometry and symbol rendering.
//!
//! Turns a record (or an in-progress geometry) into an ordered list of draw
//! operations for the rendering surface. Pure: no state, no surface access.
//!
//! Every shape is emitted twice. The shadow pass comes first, offset by
//! [`SHADOW_OFFSET`] in a translucent neutral color, then the main pass. All
//! shadow ops precede all main ops so no shadow ever lands on top of a mark.

mod dash;
mod symbols;

pub use dash::{dash_pattern, dashed};
pub use symbols::{
    ARROW_NOTCH_RATIO, CORNER_RATIO, OUTLINE_RATIO, PADDING_RATIO, arrow_polygon, glyph,
};

use crate::color::RgbColor;
use crate::drawing::{DrawingRecord, DrawingStyle, Geometry};
use kurbo::{Affine, BezPath, Cap, Join, PathEl, Stroke, Vec2};
use peniko::Color;

/// Offset of the drop shadow, in pixels.
pub const SHADOW_OFFSET: Vec2 = Vec2::new(2.0, 2.0);
/// Opacity of the drop shadow.
pub const SHADOW_ALPHA: f32 = 0.4;
/// Opacity multiplier for previews (symbol cursor, in-progress strokes).
pub const PREVIEW_ALPHA: f32 = 0.5;

/// Which copy of a shape an op belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Shadow,
    Main,
}

/// Committed marks render opaque; previews render translucent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Committed,
    Preview,
}

impl Variant {
    fn main_alpha(self) -> f32 {
        match self {
            Variant::Committed => 1.0,
            Variant::Preview => PREVIEW_ALPHA,
        }
    }

    fn shadow_alpha(self) -> f32 {
        SHADOW_ALPHA * self.main_alpha()
    }
}

/// How a path is painted.
#[derive(Debug, Clone)]
pub enum Paint {
    Stroke { style: Stroke, color: Color },
    Fill { color: Color },
}

impl Paint {
    pub fn color(&self) -> Color {
        match self {
            Paint::Stroke { color, .. } | Paint::Fill { color } => *color,
        }
    }

    fn recolored(&self, color: Color) -> Paint {
        match self {
            Paint::Stroke { style, .. } => Paint::Stroke {
                style: style.clone(),
                color,
            },
            Paint::Fill { .. } => Paint::Fill { color },
        }
    }
}

/// One shape-drawing call on the surface.
#[derive(Debug, Clone)]
pub struct DrawOp {
    pub pass: Pass,
    pub path: BezPath,
    pub paint: Paint,
}

impl DrawOp {
    /// Whether every coordinate in the path is finite.
    pub fn is_finite(&self) -> bool {
        self.path.elements().iter().all(|el| match el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => p.is_finite(),
            PathEl::QuadTo(a, b) => a.is_finite() && b.is_finite(),
            PathEl::CurveTo(a, b, c) => a.is_finite() && b.is_finite() && c.is_finite(),
            PathEl::ClosePath => true,
        })
    }
}

/// Draw ops for a committed record.
pub fn record_ops(record: &DrawingRecord) -> Vec<DrawOp> {
    geometry_ops(record.geometry(), record.style(), Variant::Committed)
}

/// Draw ops for any geometry in the given style.
pub fn geometry_ops(geometry: &Geometry, style: &DrawingStyle, variant: Variant) -> Vec<DrawOp> {
    let main_color = style.color.with_alpha(variant.main_alpha());
    let width = f64::from(style.width);

    let main: Vec<(BezPath, Paint)> = match geometry {
        Geometry::Stroke(stroke) => {
            let path = stroke.to_path();
            let path = match dash_pattern(style.texture, width) {
                Some(pattern) => dashed(&path, &pattern),
                None => path,
            };
            let stroke_style = Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round);
            vec![(
                path,
                Paint::Stroke {
                    style: stroke_style,
                    color: main_color,
                },
            )]
        }
        Geometry::Box(b) => {
            // Box outlines ignore the texture on purpose.
            let mut path = BezPath::new();
            let rect = b.rect();
            path.move_to((rect.x0, rect.y0));
            path.line_to((rect.x1, rect.y0));
            path.line_to((rect.x1, rect.y1));
            path.line_to((rect.x0, rect.y1));
            path.close_path();
            vec![(
                path,
                Paint::Stroke {
                    style: Stroke::new(width).with_join(Join::Miter),
                    color: main_color,
                },
            )]
        }
        Geometry::Symbol(symbol) => glyph(symbol, main_color),
    };

    with_shadow(main, variant)
}

/// Prefix the main shapes with their offset shadow copies.
fn with_shadow(main: Vec<(BezPath, Paint)>, variant: Variant) -> Vec<DrawOp> {
    let shadow_color = RgbColor::black().with_alpha(variant.shadow_alpha());
    let offset = Affine::translate(SHADOW_OFFSET);

    let mut ops = Vec::with_capacity(main.len() * 2);
    for (path, paint) in &main {
        let mut shadow_path = path.clone();
        shadow_path.apply_affine(offset);
        ops.push(DrawOp {
            pass: Pass::Shadow,
            path: shadow_path,
            paint: paint.recolored(shadow_color),
        });
    }
    ops.extend(main.into_iter().map(|(path, paint)| DrawOp {
        pass: Pass::Main,
        path,
        paint,
    }));
    ops
}
