//! Test doubles shared by the unit tests.

use crate::paint::DrawOp;
use crate::surface::{DrawSurface, ShapeHandle, SurfaceError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Everything a [`RecordingSurface`] has been asked to do.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    pub added: Vec<(ShapeHandle, Vec<DrawOp>)>,
    pub removed: Vec<ShapeHandle>,
    /// Every `add_shape` call, including failed ones.
    pub attempts: usize,
    pub live: BTreeMap<ShapeHandle, Vec<DrawOp>>,
}

#[derive(Debug, Default)]
struct Inner {
    log: SurfaceLog,
    next: u64,
    not_ready: bool,
    reject_next: bool,
    reject_all: bool,
}

/// Surface that records every call. Clones share the same log, so a test
/// can keep one copy while the session owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    inner: Rc<RefCell<Inner>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.inner.borrow_mut().not_ready = !ready;
    }

    /// Fail the next `add_shape` call.
    pub fn reject_next(&self) {
        self.inner.borrow_mut().reject_next = true;
    }

    /// Fail every `add_shape` call while set.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.inner.borrow_mut().reject_all = rejecting;
    }

    pub fn log(&self) -> SurfaceLog {
        self.inner.borrow().log.clone()
    }

    pub fn live_count(&self) -> usize {
        self.inner.borrow().log.live.len()
    }
}

impl DrawSurface for RecordingSurface {
    fn is_ready(&self) -> bool {
        !self.inner.borrow().not_ready
    }

    fn add_shape(&mut self, ops: Vec<DrawOp>) -> Result<ShapeHandle, SurfaceError> {
        let mut inner = self.inner.borrow_mut();
        inner.log.attempts += 1;
        if inner.not_ready {
            return Err(SurfaceError::NotReady);
        }
        if inner.reject_all {
            return Err(SurfaceError::Rejected("test rejection".into()));
        }
        if inner.reject_next {
            inner.reject_next = false;
            return Err(SurfaceError::Rejected("test rejection".into()));
        }
        inner.next += 1;
        let handle = ShapeHandle::new(inner.next);
        inner.log.added.push((handle, ops.clone()));
        inner.log.live.insert(handle, ops);
        Ok(handle)
    }

    fn remove_shape(&mut self, handle: ShapeHandle) -> Result<(), SurfaceError> {
        let mut inner = self.inner.borrow_mut();
        if inner.log.live.remove(&handle).is_none() {
            return Err(SurfaceError::UnknownHandle(handle));
        }
        inner.log.removed.push(handle);
        Ok(())
    }
}
