//! Wire protocol.
//!
//! Two logical messages travel between participants: `drawing-created`
//! carries a full record, `drawing-deleted` an erase request. Both are JSON
//! payloads with camelCase keys, published under an event name.
//!
//! The relay frames that wrap them on a WebSocket live here as well, since
//! both ends of the connection share them.

use crate::clock::Timestamp;
use crate::color::RgbColor;
use crate::drawing::{
    BoxGeometry, DrawingId, DrawingKind, DrawingRecord, DrawingStyle, Geometry, LineTexture,
    RecordError, StrokeGeometry, SymbolGeometry, SymbolSize, SymbolType,
};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Event name for [`DrawingCreated`].
pub const DRAWING_CREATED: &str = "drawing-created";
/// Event name for [`DrawingDeleted`].
pub const DRAWING_DELETED: &str = "drawing-deleted";

/// Reasons an inbound message is dropped.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Missing field for {kind:?}: {field}")]
    MissingField { kind: DrawingKind, field: &'static str },
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid drawing: {0}")]
    Invalid(#[from] RecordError),
}

/// Payload of `drawing-created`: every field of a record, flattened.
///
/// Geometry fields are present only for the kind that uses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingCreated {
    pub id: String,
    pub owner_id: String,
    #[serde(default)]
    pub owner_display_name: String,
    pub kind: DrawingKind,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,

    /// Stroke: anchor point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<[f64; 2]>,
    /// Stroke: points relative to the anchor, starting at `[0, 0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<[f64; 2]>>,
    /// Symbol: center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SymbolSize>,
    /// Box: first corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<[f64; 2]>,
    /// Box: opposite corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<[f64; 2]>,

    pub width: u32,
    /// `#rrggbb`.
    pub color: String,
    #[serde(default = "opaque")]
    pub alpha: u8,
    #[serde(default)]
    pub texture: LineTexture,
}

fn opaque() -> u8 {
    255
}

fn pair(point: Point) -> [f64; 2] {
    [point.x, point.y]
}

impl From<&DrawingRecord> for DrawingCreated {
    fn from(record: &DrawingRecord) -> Self {
        let style = record.style();
        let mut message = DrawingCreated {
            id: record.id().to_string(),
            owner_id: record.owner_id().to_string(),
            owner_display_name: record.owner_display_name().to_string(),
            kind: record.kind(),
            created_at: record.created_at(),
            expires_at: record.expires_at(),
            anchor: None,
            points: None,
            at: None,
            symbol: None,
            size: None,
            from: None,
            to: None,
            width: style.width,
            color: style.color.to_hex(),
            alpha: style.alpha,
            texture: style.texture,
        };
        match record.geometry() {
            Geometry::Stroke(stroke) => {
                message.anchor = Some(pair(stroke.anchor()));
                message.points = Some(stroke.points().iter().map(|v| [v.x, v.y]).collect());
            }
            Geometry::Symbol(symbol) => {
                message.at = Some(pair(symbol.at()));
                message.symbol = Some(symbol.symbol());
                message.size = Some(symbol.size());
            }
            Geometry::Box(b) => {
                message.from = Some(pair(b.start()));
                message.to = Some(pair(b.end()));
            }
        }
        message
    }
}

impl DrawingCreated {
    fn required<T>(&self, value: Option<T>, field: &'static str) -> Result<T, ProtocolError> {
        value.ok_or(ProtocolError::MissingField { kind: self.kind, field })
    }

    fn geometry(&self) -> Result<Geometry, ProtocolError> {
        let point = |[x, y]: [f64; 2]| Point::new(x, y);
        let geometry = match self.kind {
            DrawingKind::Stroke => {
                let anchor = self.required(self.anchor, "anchor")?;
                let points = self.required(self.points.as_ref(), "points")?;
                let offsets = points.iter().map(|[x, y]| Vec2::new(*x, *y)).collect();
                Geometry::Stroke(StrokeGeometry::new(point(anchor), offsets)?)
            }
            DrawingKind::Symbol => {
                let at = self.required(self.at, "at")?;
                let symbol = self.required(self.symbol, "symbol")?;
                let size = self.required(self.size, "size")?;
                Geometry::Symbol(SymbolGeometry::new(point(at), symbol, size)?)
            }
            DrawingKind::Box => {
                let from = self.required(self.from, "from")?;
                let to = self.required(self.to, "to")?;
                Geometry::Box(BoxGeometry::new(point(from), point(to))?)
            }
        };
        Ok(geometry)
    }
}

impl TryFrom<DrawingCreated> for DrawingRecord {
    type Error = ProtocolError;

    fn try_from(message: DrawingCreated) -> Result<Self, Self::Error> {
        let geometry = message.geometry()?;
        let color =
            RgbColor::from_hex(&message.color).ok_or_else(|| ProtocolError::InvalidColor(message.color.clone()))?;
        let style = DrawingStyle {
            width: message.width,
            color,
            alpha: message.alpha,
            texture: message.texture,
        };
        let record = DrawingRecord::new(
            DrawingId::from_remote(message.id)?,
            message.owner_id,
            message.owner_display_name,
            geometry,
            style,
            message.created_at,
            message.expires_at,
        )?;
        Ok(record)
    }
}

/// Payload of `drawing-deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingDeleted {
    /// Who is erasing. With `scope_all == false` their drawings are removed.
    pub owner_id: String,
    pub scope_all: bool,
}

/// A message on the drawing channel.
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    Created(DrawingCreated),
    Deleted(DrawingDeleted),
}

impl WireMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            WireMessage::Created(_) => DRAWING_CREATED,
            WireMessage::Deleted(_) => DRAWING_DELETED,
        }
    }

    /// Actor the message originates from.
    pub fn owner_id(&self) -> &str {
        match self {
            WireMessage::Created(m) => &m.owner_id,
            WireMessage::Deleted(m) => &m.owner_id,
        }
    }

    pub fn to_payload(&self) -> Result<Value, ProtocolError> {
        let payload = match self {
            WireMessage::Created(m) => serde_json::to_value(m)?,
            WireMessage::Deleted(m) => serde_json::to_value(m)?,
        };
        Ok(payload)
    }

    /// Decode a received event. Nothing is validated beyond the shape of the
    /// payload; records are checked when converted.
    pub fn decode(event: &str, payload: Value) -> Result<Self, ProtocolError> {
        match event {
            DRAWING_CREATED => Ok(WireMessage::Created(serde_json::from_value(payload)?)),
            DRAWING_DELETED => Ok(WireMessage::Deleted(serde_json::from_value(payload)?)),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

/// Frames a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Join a session room.
    Join { room: String },
    /// Leave the current room.
    Leave,
    /// Publish an event to the other peers in the room.
    Publish { event: String, payload: Value },
}

/// Frames the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Room join confirmed.
    Joined { room: String, peer_count: usize },
    PeerJoined { peer_id: String },
    PeerLeft { peer_id: String },
    /// An event published by another peer.
    Message { from: String, event: String, payload: Value },
    Error { message: String },
}
