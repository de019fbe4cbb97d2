//! Room bookkeeping.

use dashmap::DashMap;
use scrawl_core::protocol::ServerFrame;
use std::collections::HashSet;
use tokio::sync::broadcast;

/// Per-room channel capacity. Slow peers that fall further behind lose
/// the oldest frames.
pub const CHANNEL_CAPACITY: usize = 256;

/// Longest accepted room name, in bytes.
pub const MAX_ROOM_NAME: usize = 128;

/// A frame tagged with the peer it came from.
pub type Envelope = (String, ServerFrame);

/// Room state
struct Room {
    tx: broadcast::Sender<Envelope>,
    peers: HashSet<String>,
}

impl Room {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            peers: HashSet::new(),
        }
    }
}

/// Active rooms. Nothing is stored beyond membership: a peer joining late
/// sees only what is published after it joined.
#[derive(Default)]
pub struct Rooms {
    rooms: DashMap<String, Room>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is acceptable as a room name.
    pub fn is_valid_name(name: &str) -> bool {
        !name.trim().is_empty() && name.len() <= MAX_ROOM_NAME
    }

    /// Add a peer, creating the room if needed. Returns the room feed and
    /// the peer count including the new peer.
    pub fn join(&self, room_id: &str, peer_id: &str) -> (broadcast::Receiver<Envelope>, usize) {
        let mut room = self.rooms.entry(room_id.to_string()).or_insert_with(Room::new);
        room.peers.insert(peer_id.to_string());
        (room.tx.subscribe(), room.peers.len())
    }

    /// Remove a peer. Empty rooms are dropped. Returns whether the peer was
    /// a member.
    pub fn leave(&self, room_id: &str, peer_id: &str) -> bool {
        let Some(mut room) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let was_member = room.peers.remove(peer_id);
        if room.peers.is_empty() {
            drop(room);
            self.rooms.remove(room_id);
        }
        was_member
    }

    /// Send a frame to every subscriber of the room. Returns how many
    /// receivers it reached, the sender's own feed included.
    pub fn broadcast(&self, room_id: &str, from: &str, frame: ServerFrame) -> usize {
        match self.rooms.get(room_id) {
            Some(room) => room.tx.send((from.to_string(), frame)).unwrap_or(0),
            None => 0,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn peer_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |room| room.peers.len())
    }
}
