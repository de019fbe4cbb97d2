//! Scrawl Core Library
//!
//! Platform-agnostic engine for a shared, multi-writer annotation layer:
//! participants draw temporary strokes, boxes and stamped symbols on a common
//! canvas, see each other's marks live, and have them expire or be erased.
//!
//! The [`DrawingSession`] ties the pieces together. Everything it talks to
//! outside of this crate (rendering surface, transport, clock) is injected.

pub mod actor;
pub mod broadcast;
pub mod clock;
pub mod color;
pub mod config;
pub mod drawing;
pub mod expiry;
pub mod input;
pub mod paint;
pub mod policy;
pub mod protocol;
pub mod session;
pub mod store;
pub mod surface;
pub mod tools;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use actor::{Actor, HostIdentity, Role};
pub use broadcast::{BroadcastRouter, RouteOutcome};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use color::{HostColor, RgbColor};
pub use config::{ActivationKeyMode, ConfigError, SessionConfig};
pub use drawing::{
    BoxGeometry, DrawingId, DrawingKind, DrawingRecord, DrawingStyle, Geometry, LineTexture,
    RecordError, StrokeGeometry, SymbolGeometry, SymbolSize, SymbolType,
};
pub use expiry::{Cadence, ExpiryScheduler};
pub use input::{ActivationKeys, KeyEvent, PointerEvent, ToolIntent};
pub use paint::{DrawOp, Paint, Pass, Variant};
pub use policy::SessionPolicy;
pub use protocol::{DrawingCreated, DrawingDeleted, ProtocolError, WireMessage};
pub use session::{Action, Denied, DrawingSession, Notice, SessionEvent};
pub use store::DrawingStore;
pub use surface::{DrawSurface, ShapeHandle, SurfaceError};
pub use tools::{InteractionState, ToolMode, ToolOption, ToolPhase, ToolSettings};
pub use transport::{Inbound, LoopbackBus, LoopbackTransport, Transport, TransportError};

#[cfg(not(target_arch = "wasm32"))]
pub use transport::RelayTransport;
