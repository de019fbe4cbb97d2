//! Broadcast router.
//!
//! Outbound, local creates and erasures are encoded and handed to the
//! transport. Inbound, received events are decoded, filtered and applied to
//! the store.
//!
//! Inbound handling is idempotent: the store ignores ids it already has, so
//! redelivery and echoes of our own creates are harmless, and a delete that
//! matches nothing is a no-op. Messages authored by the local actor are
//! dropped before they reach the store at all, since their effect was
//! already applied locally.

use crate::config::SessionConfig;
use crate::drawing::{DrawingId, DrawingRecord};
use crate::protocol::{DrawingCreated, DrawingDeleted, WireMessage};
use crate::store::DrawingStore;
use crate::surface::DrawSurface;
use crate::transport::{Inbound, Transport, TransportError};
use serde_json::Value;
use std::collections::VecDeque;

/// Outbound messages held while the transport is not ready.
pub const OUTBOUND_QUEUE_LIMIT: usize = 256;

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Inserted(DrawingId),
    /// Records removed by a delete. May be empty.
    Removed(Vec<DrawingId>),
    /// Authored by the local actor.
    SelfEcho,
    /// A record with that id is already present.
    Duplicate,
    /// Could not be decoded or validated.
    Malformed,
}

/// Moves drawing messages between the store and the transport.
pub struct BroadcastRouter {
    local_actor_id: String,
    transport: Option<Box<dyn Transport>>,
    outbound: VecDeque<(&'static str, Value)>,
    /// Remote stroke widths are clamped into `min_width..=max_width`.
    min_width: u32,
    max_width: u32,
}

impl std::fmt::Debug for BroadcastRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastRouter")
            .field("local_actor_id", &self.local_actor_id)
            .field("enabled", &self.transport.is_some())
            .field("pending", &self.outbound.len())
            .field("width_bounds", &(self.min_width..=self.max_width))
            .finish()
    }
}

impl BroadcastRouter {
    /// `None` disables broadcasting: everything keeps working locally.
    pub fn new(local_actor_id: impl Into<String>, transport: Option<Box<dyn Transport>>) -> Self {
        let defaults = SessionConfig::default();
        Self {
            local_actor_id: local_actor_id.into(),
            transport,
            outbound: VecDeque::new(),
            min_width: defaults.min_stroke_width,
            max_width: defaults.max_stroke_width,
        }
    }

    /// Take the stroke width range from `config`.
    pub fn set_width_bounds(&mut self, config: &SessionConfig) {
        self.min_width = config.clamp_width(0);
        self.max_width = config.clamp_width(u32::MAX);
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Whether the transport is present and ready.
    pub fn is_ready(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_ready())
    }

    /// Replace the transport. Queued messages go out on the new one.
    pub fn set_transport(&mut self, transport: Option<Box<dyn Transport>>) {
        if transport.is_none() && !self.outbound.is_empty() {
            log::debug!("Broadcast disabled, dropping {} queued message(s)", self.outbound.len());
            self.outbound.clear();
        }
        self.transport = transport;
    }

    pub fn local_actor_id(&self) -> &str {
        &self.local_actor_id
    }

    /// Messages waiting for the transport to become ready.
    pub fn pending(&self) -> usize {
        self.outbound.len()
    }

    /// Announce a locally committed record.
    pub fn announce_created(&mut self, record: &DrawingRecord) {
        self.send(WireMessage::Created(DrawingCreated::from(record)));
    }

    /// Announce a local erase: everything, or the given owner's drawings.
    pub fn announce_deleted(&mut self, owner_id: &str, scope_all: bool) {
        self.send(WireMessage::Deleted(DrawingDeleted {
            owner_id: owner_id.to_string(),
            scope_all,
        }));
    }

    fn send(&mut self, message: WireMessage) {
        if self.transport.is_none() {
            return;
        }
        let payload = match message.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Failed to encode {}: {}", message.event_name(), e);
                return;
            }
        };
        if self.outbound.len() >= OUTBOUND_QUEUE_LIMIT {
            if let Some((event, _)) = self.outbound.pop_front() {
                log::warn!("Outbound queue full, dropping oldest {}", event);
            }
        }
        self.outbound.push_back((message.event_name(), payload));
        self.flush();
    }

    /// Send queued messages, in order, if the transport is ready. Returns
    /// how many were handed over.
    pub fn flush(&mut self) -> usize {
        let Some(transport) = self.transport.as_mut() else {
            return 0;
        };
        let mut sent = 0;
        while transport.is_ready() {
            let Some((event, payload)) = self.outbound.pop_front() else {
                break;
            };
            match transport.emit(event, payload.clone()) {
                Ok(()) => sent += 1,
                Err(TransportError::NotReady) => {
                    self.outbound.push_front((event, payload));
                    break;
                }
                Err(e) => log::warn!("Dropped outbound {}: {}", event, e),
            }
        }
        sent
    }

    /// Drain the transport and apply every received message.
    pub fn receive<S: DrawSurface>(&mut self, store: &mut DrawingStore<S>) -> Vec<RouteOutcome> {
        let Some(transport) = self.transport.as_mut() else {
            return Vec::new();
        };
        let inbound = transport.poll();
        inbound.into_iter().map(|message| self.route(message, store)).collect()
    }

    /// Apply one received message to the store.
    pub fn route<S: DrawSurface>(&self, inbound: Inbound, store: &mut DrawingStore<S>) -> RouteOutcome {
        let message = match WireMessage::decode(&inbound.event, inbound.payload) {
            Ok(message) => message,
            Err(e) => {
                log::debug!("Dropping inbound {}: {}", inbound.event, e);
                return RouteOutcome::Malformed;
            }
        };
        if message.owner_id() == self.local_actor_id {
            return RouteOutcome::SelfEcho;
        }

        match message {
            WireMessage::Created(mut created) => {
                // Zero stays invalid; anything else is pulled into range.
                if created.width != 0 {
                    created.width = created.width.clamp(self.min_width, self.max_width);
                }
                let record = match DrawingRecord::try_from(created) {
                    Ok(record) => record,
                    Err(e) => {
                        log::debug!("Dropping invalid drawing: {}", e);
                        return RouteOutcome::Malformed;
                    }
                };
                let id = record.id().clone();
                if store.insert(record) {
                    RouteOutcome::Inserted(id)
                } else {
                    RouteOutcome::Duplicate
                }
            }
            WireMessage::Deleted(deleted) => {
                let removed = if deleted.scope_all {
                    store.remove_all()
                } else {
                    store.remove_by_owner(&deleted.owner_id)
                };
                RouteOutcome::Removed(removed.iter().map(|r| r.id().clone()).collect())
            }
        }
    }
}
