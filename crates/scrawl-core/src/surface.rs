//! Rendering surface contract.
//!
//! The host owns a retained child container that shapes are added to and
//! removed from by handle. The engine never draws directly; it hands the
//! surface the ops produced by [`crate::paint`] and keeps the handle.

use crate::paint::DrawOp;
use std::fmt;
use thiserror::Error;

/// Opaque handle for a shape placed on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(u64);

impl ShapeHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// Surface failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("Rendering surface is not ready")]
    NotReady,
    #[error("Shape rejected: {0}")]
    Rejected(String),
    #[error("Unknown shape handle {0}")]
    UnknownHandle(ShapeHandle),
}

/// A retained container of shapes.
pub trait DrawSurface {
    /// Whether shapes can be added yet. Surfaces that are ready from
    /// construction keep the default.
    fn is_ready(&self) -> bool {
        true
    }

    /// Add one shape, made of the given ops in order.
    fn add_shape(&mut self, ops: Vec<DrawOp>) -> Result<ShapeHandle, SurfaceError>;

    /// Remove a shape previously added.
    fn remove_shape(&mut self, handle: ShapeHandle) -> Result<(), SurfaceError>;
}

/// Add a shape, turning any surface failure into a dropped shape and a
/// warning.
pub fn place<S: DrawSurface + ?Sized>(surface: &mut S, ops: Vec<DrawOp>) -> Option<ShapeHandle> {
    if !surface.is_ready() {
        log::debug!("Surface not ready, deferring shape");
        return None;
    }
    match surface.add_shape(ops) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Dropped shape: {}", e);
            None
        }
    }
}

/// Remove a shape, logging instead of failing.
pub fn release<S: DrawSurface + ?Sized>(surface: &mut S, handle: ShapeHandle) {
    if let Err(e) = surface.remove_shape(handle) {
        log::warn!("Failed to remove {}: {}", handle, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSurface;

    #[test]
    fn test_place_on_unready_surface() {
        let mut surface = RecordingSurface::new();
        surface.set_ready(false);
        assert!(place(&mut surface, Vec::new()).is_none());
        assert!(surface.log().added.is_empty());
    }

    #[test]
    fn test_place_swallows_rejection() {
        let mut surface = RecordingSurface::new();
        surface.reject_next();
        assert!(place(&mut surface, Vec::new()).is_none());
        assert!(place(&mut surface, Vec::new()).is_some());
    }

    #[test]
    fn test_release_unknown_handle_is_quiet() {
        let mut surface = RecordingSurface::new();
        release(&mut surface, ShapeHandle::new(99));
        assert!(surface.log().removed.is_empty());
    }
}
