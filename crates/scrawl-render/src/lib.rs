//! Scrawl Render Library
//!
//! A retained [`DisplayList`] that the engine paints into, and renderers
//! that turn it into output. SVG is always available; the Vello backend is
//! behind the `vello-renderer` feature.

mod display_list;
mod renderer;
mod svg;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use display_list::DisplayList;
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use svg::SvgRenderer;

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
