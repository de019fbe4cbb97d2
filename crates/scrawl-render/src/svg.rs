//! SVG renderer.
//!
//! Writes the display list as a standalone SVG document. Handy for
//! snapshots, exports and headless tests.

use crate::renderer::{RenderContext, Renderer};
use kurbo::{Cap, Join, Stroke};
use peniko::Color;
use scrawl_core::{DrawOp, Paint};
use std::fmt::{self, Write};

/// Renders to an SVG string.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    svg: String,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document from the last [`build_scene`](Renderer::build_scene).
    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn take_svg(&mut self) -> String {
        std::mem::take(&mut self.svg)
    }
}

impl Renderer for SvgRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.svg.clear();
        if let Err(e) = write_document(&mut self.svg, ctx) {
            log::error!("SVG output failed: {}", e);
            self.svg.clear();
        }
    }
}

fn write_document(out: &mut String, ctx: &RenderContext) -> fmt::Result {
    let (width, height) = (ctx.viewport_size.width, ctx.viewport_size.height);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )?;
    if let Some(background) = ctx.background_color {
        writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}" fill-opacity="{}"/>"#,
            hex(background),
            opacity(background)
        )?;
    }

    let [a, b, c, d, e, f] = ctx.transform().as_coeffs();
    writeln!(out, r#"  <g transform="matrix({a} {b} {c} {d} {e} {f})">"#)?;
    for op in ctx.display.ops() {
        write_op(out, op)?;
    }
    writeln!(out, "  </g>")?;
    writeln!(out, "</svg>")
}

fn write_op(out: &mut String, op: &DrawOp) -> fmt::Result {
    let d = op.path.to_svg();
    match &op.paint {
        Paint::Stroke { style, color } => writeln!(
            out,
            r#"    <path d="{d}" fill="none" stroke="{}" stroke-opacity="{}" {}/>"#,
            hex(*color),
            opacity(*color),
            stroke_attrs(style)
        ),
        Paint::Fill { color } => writeln!(
            out,
            r#"    <path d="{d}" fill="{}" fill-opacity="{}"/>"#,
            hex(*color),
            opacity(*color)
        ),
    }
}

fn stroke_attrs(style: &Stroke) -> String {
    let cap = match style.start_cap {
        Cap::Butt => "butt",
        Cap::Square => "square",
        Cap::Round => "round",
    };
    let join = match style.join {
        Join::Bevel => "bevel",
        Join::Miter => "miter",
        Join::Round => "round",
    };
    format!(
        r#"stroke-width="{}" stroke-linecap="{cap}" stroke-linejoin="{join}""#,
        style.width
    )
}

fn hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

fn opacity(color: Color) -> f32 {
    let alpha = f32::from(color.to_rgba8().a) / 255.0;
    (alpha * 100.0).round() / 100.0
}
