//! Scrawl WebSocket Relay Server
//!
//! Fans drawing messages out between the clients of one drawing session.
//! Each session is a room; the relay neither stores nor interprets the
//! messages.
//!
//! ## Protocol
//!
//! Messages are JSON with the following format:
//! ```json
//! { "type": "join", "room": "scene-id" }
//! { "type": "publish", "event": "drawing-created", "payload": { ... } }
//! { "type": "leave" }
//! ```
//!
//! The relay answers with `joined`, `peer_joined`, `peer_left`, `message`
//! and `error` frames. A published event is delivered to every other peer
//! in the room, never back to its sender.

mod peer;
mod rooms;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use peer::Peer;
use rooms::{Envelope, Rooms};
use scrawl_core::protocol::{ClientFrame, ServerFrame};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::broadcast::error::RecvError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

const DEFAULT_ADDR: &str = "0.0.0.0:3030";

/// Bind address from `SCRAWL_RELAY_ADDR`, falling back to the default.
fn bind_addr() -> SocketAddr {
    let fallback = SocketAddr::from(([0, 0, 0, 0], 3030));
    match std::env::var("SCRAWL_RELAY_ADDR") {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Ignoring SCRAWL_RELAY_ADDR {:?}: {}, using {}", raw, e, DEFAULT_ADDR);
            fallback
        }),
        Err(_) => fallback,
    }
}

fn app(rooms: Arc<Rooms>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(rooms)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrawl_relay=info,tower_http=info".into()),
        )
        .init();

    let rooms = Arc::new(Rooms::new());
    let addr = bind_addr();
    info!("Scrawl relay server listening on {}", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(rooms)).await
}

/// Index page
async fn index() -> &'static str {
    "Scrawl Relay Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(rooms): State<Arc<Rooms>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, rooms))
}

fn encode(frame: &ServerFrame) -> Option<Message> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            error!("Failed to encode frame: {}", e);
            None
        }
    }
}

/// Wait for the next frame from the peer's room, or forever if it is in none.
async fn next_envelope(peer: &mut Peer) -> Option<Envelope> {
    match peer.feed_mut() {
        Some(feed) => match feed.recv().await {
            Ok(envelope) => Some(envelope),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Peer lagged, skipped {} frame(s)", skipped);
                None
            }
            Err(RecvError::Closed) => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, rooms: Arc<Rooms>) {
    let mut peer = Peer::new(Uuid::new_v4().to_string());
    info!("New connection: {}", peer.id());

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            // Handle incoming messages from client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(frame) => peer.handle(frame, &rooms),
                            Err(e) => {
                                warn!("Invalid message from {}: {}", peer.id(), e);
                                Some(ServerFrame::Error {
                                    message: format!("Invalid message: {}", e),
                                })
                            }
                        };
                        if let Some(message) = reply.as_ref().and_then(encode) {
                            if sender.send(message).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        warn!("Ignoring binary message from {}", peer.id());
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore ping/pong
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer.id(), e);
                        break;
                    }
                }
            }

            // Handle broadcast messages from room
            envelope = next_envelope(&mut peer) => {
                if let Some((from, frame)) = envelope {
                    if peer.should_forward(&from) {
                        if let Some(message) = encode(&frame) {
                            if sender.send(message).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    // Cleanup on disconnect
    peer.leave(&rooms);
    info!("Connection closed: {}", peer.id());
}
