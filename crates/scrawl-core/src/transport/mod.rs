//! Transport collaborator.
//!
//! A narrow pub/sub contract: publish an event, poll for received ones, and
//! say whether the channel is usable yet. Delivery is best effort: messages
//! may be duplicated, arrive out of order across event types, or be lost.
//!
//! Adapters:
//! - [`LoopbackTransport`]: in-process bus, echoes to every subscriber.
//! - [`RelayTransport`] (native): WebSocket client for `scrawl-relay`.

mod loopback;
#[cfg(not(target_arch = "wasm32"))]
mod relay;

pub use loopback::{LoopbackBus, LoopbackTransport};
#[cfg(not(target_arch = "wasm32"))]
pub use relay::RelayTransport;

use serde_json::Value;
use thiserror::Error;

/// Transport failures. None of these stop the engine; the router logs and
/// carries on locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Transport is not ready")]
    NotReady,
    #[error("Transport is closed")]
    Closed,
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),
    #[error("Send failed: {0}")]
    Send(String),
}

/// A received event, not yet decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub event: String,
    pub payload: Value,
}

impl Inbound {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// Pub/sub channel shared by every participant of a session.
pub trait Transport {
    /// Whether `emit` can be called. Polling may change the answer.
    fn is_ready(&self) -> bool;

    /// Publish an event. Fire and forget.
    fn emit(&mut self, event: &str, payload: Value) -> Result<(), TransportError>;

    /// Drain events received since the last poll (non-blocking).
    fn poll(&mut self) -> Vec<Inbound>;
}
