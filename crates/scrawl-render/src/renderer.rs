//! Renderer trait abstraction.

use crate::display_list::DisplayList;
use kurbo::{Affine, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The shapes to render.
    pub display: &'a DisplayList,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// World to screen transform of the host canvas.
    pub view: Affine,
    /// Background color. `None` leaves the output transparent so the
    /// annotation layer can sit on top of the host scene.
    pub background_color: Option<Color>,
}

impl<'a> RenderContext<'a> {
    pub fn new(display: &'a DisplayList, viewport_size: Size) -> Self {
        Self {
            display,
            viewport_size,
            scale_factor: 1.0,
            view: Affine::IDENTITY,
            background_color: None,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the world to screen transform (pan and zoom).
    pub fn with_view(mut self, view: Affine) -> Self {
        self.view = view;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    /// Full transform from world to physical pixels.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * self.view
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the output for a frame from the display list.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Option<Color> {
        ctx.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_transform_applies_view_then_scale() {
        let display = DisplayList::new();
        let ctx = RenderContext::new(&display, Size::new(100.0, 100.0))
            .with_view(Affine::translate((10.0, 0.0)))
            .with_scale_factor(2.0);
        assert_eq!(ctx.transform() * Point::new(1.0, 1.0), Point::new(22.0, 2.0));
        assert!(ctx.background_color.is_none());
    }
}
