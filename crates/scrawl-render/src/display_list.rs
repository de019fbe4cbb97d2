//! Retained display list.

use kurbo::{Rect, Shape};
use scrawl_core::{DrawOp, DrawSurface, Paint, ShapeHandle, SurfaceError};
use std::collections::BTreeMap;

/// In-memory drawing surface.
///
/// Shapes are kept in the order they were added, which is also their paint
/// order. Handles are never reused.
#[derive(Debug, Clone)]
pub struct DisplayList {
    shapes: BTreeMap<ShapeHandle, Vec<DrawOp>>,
    next_handle: u64,
    ready: bool,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayList {
    /// A ready, empty list.
    pub fn new() -> Self {
        Self {
            shapes: BTreeMap::new(),
            next_handle: 1,
            ready: true,
        }
    }

    /// A list that refuses shapes until [`mark_ready`](Self::mark_ready),
    /// like a canvas whose scene hasn't loaded yet.
    pub fn unmounted() -> Self {
        Self {
            ready: false,
            ..Self::new()
        }
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, handle: ShapeHandle) -> Option<&[DrawOp]> {
        self.shapes.get(&handle).map(Vec::as_slice)
    }

    /// Shapes in paint order.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeHandle, &[DrawOp])> + '_ {
        self.shapes.iter().map(|(handle, ops)| (*handle, ops.as_slice()))
    }

    /// Every op in paint order.
    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> + '_ {
        self.shapes.values().flatten()
    }

    /// Union of all painted areas, stroke width included. `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.ops().map(op_bounds).reduce(|acc, rect| acc.union(rect))
    }
}

fn op_bounds(op: &DrawOp) -> Rect {
    let rect = op.path.bounding_box();
    match &op.paint {
        Paint::Stroke { style, .. } => rect.inflate(style.width / 2.0, style.width / 2.0),
        Paint::Fill { .. } => rect,
    }
}

impl DrawSurface for DisplayList {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn add_shape(&mut self, ops: Vec<DrawOp>) -> Result<ShapeHandle, SurfaceError> {
        if !self.ready {
            return Err(SurfaceError::NotReady);
        }
        if ops.is_empty() {
            return Err(SurfaceError::Rejected("empty shape".into()));
        }
        if !ops.iter().all(DrawOp::is_finite) {
            return Err(SurfaceError::Rejected("non-finite coordinates".into()));
        }
        let handle = ShapeHandle::new(self.next_handle);
        self.next_handle += 1;
        self.shapes.insert(handle, ops);
        Ok(handle)
    }

    fn remove_shape(&mut self, handle: ShapeHandle) -> Result<(), SurfaceError> {
        self.shapes
            .remove(&handle)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownHandle(handle))
    }
}
