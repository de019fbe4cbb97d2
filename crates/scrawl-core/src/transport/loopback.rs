//! In-process transport.
//!
//! Every transport connected to the same [`LoopbackBus`] receives every
//! published event, its own included, which is what a naive broadcast
//! channel does and what self-echo suppression has to cope with.

use super::{Inbound, Transport, TransportError};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug)]
struct Bus {
    ready: bool,
    queues: Vec<VecDeque<Inbound>>,
    published: Vec<Inbound>,
}

/// Shared in-process message bus.
#[derive(Debug, Clone)]
pub struct LoopbackBus {
    inner: Rc<RefCell<Bus>>,
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackBus {
    /// A ready bus with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Bus {
                ready: true,
                queues: Vec::new(),
                published: Vec::new(),
            })),
        }
    }

    /// Connect a new subscriber.
    pub fn connect(&self) -> LoopbackTransport {
        let mut bus = self.inner.borrow_mut();
        bus.queues.push(VecDeque::new());
        LoopbackTransport {
            bus: self.clone(),
            slot: bus.queues.len() - 1,
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.inner.borrow_mut().ready = ready;
    }

    pub fn is_ready(&self) -> bool {
        self.inner.borrow().ready
    }

    /// Deliver an event to every subscriber, as if a peer outside the bus
    /// had published it. Not recorded in [`published`](Self::published).
    pub fn inject(&self, event: &str, payload: Value) {
        let mut bus = self.inner.borrow_mut();
        for queue in &mut bus.queues {
            queue.push_back(Inbound::new(event, payload.clone()));
        }
    }

    /// Everything published through the bus, in order.
    pub fn published(&self) -> Vec<Inbound> {
        self.inner.borrow().published.clone()
    }

    fn publish(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        let mut bus = self.inner.borrow_mut();
        if !bus.ready {
            return Err(TransportError::NotReady);
        }
        bus.published.push(Inbound::new(event, payload.clone()));
        for queue in &mut bus.queues {
            queue.push_back(Inbound::new(event, payload.clone()));
        }
        Ok(())
    }

    fn drain(&self, slot: usize) -> Vec<Inbound> {
        let mut bus = self.inner.borrow_mut();
        match bus.queues.get_mut(slot) {
            Some(queue) => queue.drain(..).collect(),
            None => Vec::new(),
        }
    }
}

/// One subscriber on a [`LoopbackBus`].
#[derive(Debug)]
pub struct LoopbackTransport {
    bus: LoopbackBus,
    slot: usize,
}

impl Transport for LoopbackTransport {
    fn is_ready(&self) -> bool {
        self.bus.is_ready()
    }

    fn emit(&mut self, event: &str, payload: Value) -> Result<(), TransportError> {
        self.bus.publish(event, payload)
    }

    fn poll(&mut self) -> Vec<Inbound> {
        self.bus.drain(self.slot)
    }
}
