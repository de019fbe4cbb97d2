//! Vello-based renderer implementation.

use crate::renderer::{RenderContext, Renderer};
use kurbo::{Affine, Rect};
use peniko::Fill;
use scrawl_core::{DrawOp, Paint};
use vello::Scene;

/// Vello-based renderer for GPU-accelerated 2D graphics.
///
/// Only builds the [`Scene`]; submitting it to a device is up to the host.
pub struct VelloRenderer {
    scene: Scene,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    pub fn new() -> Self {
        Self { scene: Scene::new() }
    }

    /// Get the built scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take the built scene, leaving an empty one.
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn render_op(&mut self, op: &DrawOp, transform: Affine) {
        match &op.paint {
            Paint::Stroke { style, color } => {
                self.scene.stroke(style, transform, *color, None, &op.path);
            }
            Paint::Fill { color } => {
                self.scene.fill(Fill::NonZero, transform, *color, None, &op.path);
            }
        }
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();

        if let Some(background) = ctx.background_color {
            let viewport = Rect::new(0.0, 0.0, ctx.viewport_size.width, ctx.viewport_size.height);
            self.scene.fill(Fill::NonZero, Affine::IDENTITY, background, None, &viewport);
        }

        let transform = ctx.transform();
        for op in ctx.display.ops() {
            self.render_op(op, transform);
        }
    }
}
