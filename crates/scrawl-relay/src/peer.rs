//! Per-connection state.

use crate::rooms::{Envelope, Rooms};
use scrawl_core::protocol::{ClientFrame, ServerFrame};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// One connected client and the room it is in, if any.
pub struct Peer {
    id: String,
    room: Option<String>,
    feed: Option<broadcast::Receiver<Envelope>>,
}

impl Peer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            room: None,
            feed: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn feed_mut(&mut self) -> Option<&mut broadcast::Receiver<Envelope>> {
        self.feed.as_mut()
    }

    /// Apply a client frame. Returns the reply for this peer, if any.
    pub fn handle(&mut self, frame: ClientFrame, rooms: &Rooms) -> Option<ServerFrame> {
        match frame {
            ClientFrame::Join { room } => {
                if !Rooms::is_valid_name(&room) {
                    warn!("Peer {} sent invalid room name", self.id);
                    return Some(ServerFrame::Error {
                        message: "Invalid room name".to_string(),
                    });
                }
                self.leave(rooms);
                let (feed, peer_count) = rooms.join(&room, &self.id);
                rooms.broadcast(
                    &room,
                    &self.id,
                    ServerFrame::PeerJoined {
                        peer_id: self.id.clone(),
                    },
                );
                info!("Peer {} joined room {} ({} peer(s))", self.id, room, peer_count);
                self.feed = Some(feed);
                self.room = Some(room.clone());
                Some(ServerFrame::Joined { room, peer_count })
            }
            ClientFrame::Leave => {
                self.leave(rooms);
                None
            }
            ClientFrame::Publish { event, payload } => {
                let Some(room) = &self.room else {
                    return Some(ServerFrame::Error {
                        message: "Join a room before publishing".to_string(),
                    });
                };
                debug!("Peer {} published {} to {}", self.id, event, room);
                rooms.broadcast(
                    room,
                    &self.id,
                    ServerFrame::Message {
                        from: self.id.clone(),
                        event,
                        payload,
                    },
                );
                None
            }
        }
    }

    /// Whether a room frame should be forwarded to this peer's socket.
    pub fn should_forward(&self, from: &str) -> bool {
        from != self.id
    }

    /// Leave the current room, telling the others.
    pub fn leave(&mut self, rooms: &Rooms) {
        self.feed = None;
        if let Some(room) = self.room.take() {
            rooms.leave(&room, &self.id);
            rooms.broadcast(
                &room,
                &self.id,
                ServerFrame::PeerLeft {
                    peer_id: self.id.clone(),
                },
            );
            info!("Peer {} left room {}", self.id, room);
        }
    }
}
