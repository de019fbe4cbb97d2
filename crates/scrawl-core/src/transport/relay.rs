//! Native WebSocket client for the relay server.
//!
//! The socket lives on a background thread; the engine side only touches
//! channels, so `emit` and `poll` never block.

use super::{Inbound, Transport, TransportError};
use crate::protocol::{ClientFrame, ServerFrame};
use serde_json::Value;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::{Message, connect};
use url::Url;

/// Commands sent to the WebSocket thread.
enum WsCommand {
    Send(String),
    Close,
}

/// Events from the WebSocket thread.
enum WsEvent {
    Joined { room: String, peer_count: usize },
    Message(Inbound),
    Closed,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Connecting,
    Joined,
    Closed,
}

/// Transport backed by a `scrawl-relay` room.
///
/// Not ready until the relay confirms the join.
pub struct RelayTransport {
    state: ConnectionState,
    room: String,
    cmd_tx: Option<Sender<WsCommand>>,
    event_rx: Receiver<WsEvent>,
    _thread: Option<JoinHandle<()>>,
}

impl RelayTransport {
    /// Connect to a plain `ws://` url and join `room`. TLS is not built in.
    pub fn connect(url: &str, room: impl Into<String>) -> Result<Self, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "ws" {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let room = room.into();
        let join = serde_json::to_string(&ClientFrame::Join { room: room.clone() })
            .map_err(|e| TransportError::Send(e.to_string()))?;

        let (cmd_tx, cmd_rx) = channel::<WsCommand>();
        let (event_tx, event_rx) = channel::<WsEvent>();
        let url = url.to_string();

        let handle = thread::spawn(move || run_socket(&url, join, cmd_rx, event_tx));

        Ok(Self {
            state: ConnectionState::Connecting,
            room,
            cmd_tx: Some(cmd_tx),
            event_rx,
            _thread: Some(handle),
        })
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// Leave the room and close the socket.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            if let Ok(leave) = serde_json::to_string(&ClientFrame::Leave) {
                let _ = tx.send(WsCommand::Send(leave));
            }
            let _ = tx.send(WsCommand::Close);
        }
        self._thread = None;
        self.state = ConnectionState::Closed;
    }
}

impl Transport for RelayTransport {
    fn is_ready(&self) -> bool {
        self.state == ConnectionState::Joined
    }

    fn emit(&mut self, event: &str, payload: Value) -> Result<(), TransportError> {
        match self.state {
            ConnectionState::Connecting => return Err(TransportError::NotReady),
            ConnectionState::Closed => return Err(TransportError::Closed),
            ConnectionState::Joined => {}
        }
        let frame = ClientFrame::Publish {
            event: event.to_string(),
            payload,
        };
        let text = serde_json::to_string(&frame).map_err(|e| TransportError::Send(e.to_string()))?;
        let tx = self.cmd_tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(WsCommand::Send(text))
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    fn poll(&mut self) -> Vec<Inbound> {
        let mut received = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                WsEvent::Joined { room, peer_count } => {
                    log::info!("Joined room {} with {} peer(s)", room, peer_count);
                    self.state = ConnectionState::Joined;
                }
                WsEvent::Message(inbound) => received.push(inbound),
                WsEvent::Closed => {
                    log::warn!("Relay connection closed, drawing continues locally");
                    self.state = ConnectionState::Closed;
                }
                WsEvent::Error(message) => {
                    log::warn!("Relay error: {}", message);
                }
            }
        }
        received
    }
}

impl Drop for RelayTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Socket thread body.
fn run_socket(url: &str, join: String, cmd_rx: Receiver<WsCommand>, event_tx: Sender<WsEvent>) {
    log::info!("Relay thread: connecting to {}", url);
    let (mut socket, response) = match connect(url) {
        Ok(connected) => connected,
        Err(e) => {
            log::error!("Relay connection failed: {}", e);
            let _ = event_tx.send(WsEvent::Error(format!("Connection failed: {}", e)));
            let _ = event_tx.send(WsEvent::Closed);
            return;
        }
    };
    log::info!("Relay connected, status: {}", response.status());

    // Short read timeout so the loop also services outgoing commands.
    if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
        let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
        let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
    }

    if let Err(e) = socket.send(Message::Text(join)) {
        log::error!("Relay join failed: {}", e);
        let _ = event_tx.send(WsEvent::Closed);
        return;
    }

    loop {
        match cmd_rx.try_recv() {
            Ok(WsCommand::Send(text)) => {
                if let Err(e) = socket.send(Message::Text(text)) {
                    log::error!("Relay send error: {}", e);
                    break;
                }
            }
            Ok(WsCommand::Close) => {
                let _ = socket.close(None);
                break;
            }
            Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match socket.read() {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                Ok(frame) => {
                    if let Some(event) = frame_event(frame) {
                        let _ = event_tx.send(event);
                    }
                }
                Err(e) => log::warn!("Unparseable relay frame: {}", e),
            },
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                log::error!("Relay read error: {}", e);
                break;
            }
        }
    }

    log::info!("Relay thread exiting");
    let _ = event_tx.send(WsEvent::Closed);
}

fn frame_event(frame: ServerFrame) -> Option<WsEvent> {
    match frame {
        ServerFrame::Joined { room, peer_count } => Some(WsEvent::Joined { room, peer_count }),
        ServerFrame::Message { event, payload, .. } => Some(WsEvent::Message(Inbound::new(event, payload))),
        ServerFrame::PeerJoined { peer_id } => {
            log::debug!("Peer joined: {}", peer_id);
            None
        }
        ServerFrame::PeerLeft { peer_id } => {
            log::debug!("Peer left: {}", peer_id);
            None
        }
        ServerFrame::Error { message } => Some(WsEvent::Error(message)),
    }
}
