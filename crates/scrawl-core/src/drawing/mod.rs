//! Drawing records: the immutable unit of shared state.
//!
//! A record is created once by its author, broadcast, and later deleted.
//! Nothing about it changes in between, so every field is private and only
//! exposed through getters.

mod box_shape;
mod stroke;
mod symbol;

pub use box_shape::BoxGeometry;
pub use stroke::StrokeGeometry;
pub use symbol::{SymbolGeometry, SymbolSize, SymbolType};

use crate::clock::Timestamp;
use crate::color::RgbColor;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Reasons a record (or its geometry) cannot be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("Need at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("Non-finite coordinate")]
    NonFinite,
    #[error("First stroke point must be the anchor origin")]
    MisplacedOrigin,
    #[error("Drawing id is empty")]
    EmptyId,
    #[error("Owner id is empty")]
    EmptyOwner,
    #[error("Stroke width must be positive")]
    ZeroWidth,
}

/// Globally unique drawing identifier.
///
/// Locally generated ids are UUID v4; ids from remote peers are opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawingId(String);

impl DrawingId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an id received from elsewhere.
    pub fn from_remote(id: impl Into<String>) -> Result<Self, RecordError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RecordError::EmptyId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrawingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which kind of mark a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingKind {
    Stroke,
    Symbol,
    Box,
}

/// Line texture for strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTexture {
    #[default]
    Solid,
    Dotted,
    Dashed,
}

impl LineTexture {
    /// Cycle to the next texture.
    pub fn next(self) -> Self {
        match self {
            LineTexture::Solid => LineTexture::Dashed,
            LineTexture::Dashed => LineTexture::Dotted,
            LineTexture::Dotted => LineTexture::Solid,
        }
    }
}

/// Visual style of a record.
///
/// `alpha` is carried along with the color but the main pass always renders
/// opaque; translucency is for shadow and preview variants only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingStyle {
    pub width: u32,
    pub color: RgbColor,
    pub alpha: u8,
    pub texture: LineTexture,
}

impl Default for DrawingStyle {
    fn default() -> Self {
        Self {
            width: 4,
            color: RgbColor::black(),
            alpha: 255,
            texture: LineTexture::Solid,
        }
    }
}

/// Geometry of a record, one variant per kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Stroke(StrokeGeometry),
    Symbol(SymbolGeometry),
    Box(BoxGeometry),
}

impl Geometry {
    pub fn kind(&self) -> DrawingKind {
        match self {
            Geometry::Stroke(_) => DrawingKind::Stroke,
            Geometry::Symbol(_) => DrawingKind::Symbol,
            Geometry::Box(_) => DrawingKind::Box,
        }
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Geometry::Stroke(s) => s.bounds(),
            Geometry::Symbol(s) => s.bounds(),
            Geometry::Box(b) => b.rect(),
        }
    }
}

/// A committed stroke, symbol or box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingRecord {
    id: DrawingId,
    owner_id: String,
    owner_display_name: String,
    geometry: Geometry,
    style: DrawingStyle,
    created_at: Timestamp,
    expires_at: Option<Timestamp>,
}

impl DrawingRecord {
    /// Build a record. Geometry is validated by its own constructor; this
    /// checks identity and style.
    pub fn new(
        id: DrawingId,
        owner_id: impl Into<String>,
        owner_display_name: impl Into<String>,
        geometry: Geometry,
        style: DrawingStyle,
        created_at: Timestamp,
        expires_at: Option<Timestamp>,
    ) -> Result<Self, RecordError> {
        let owner_id = owner_id.into();
        if owner_id.is_empty() {
            return Err(RecordError::EmptyOwner);
        }
        if style.width == 0 {
            return Err(RecordError::ZeroWidth);
        }
        Ok(Self {
            id,
            owner_id,
            owner_display_name: owner_display_name.into(),
            geometry,
            style,
            created_at,
            expires_at,
        })
    }

    pub fn id(&self) -> &DrawingId {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn owner_display_name(&self) -> &str {
        &self.owner_display_name
    }

    pub fn kind(&self) -> DrawingKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn style(&self) -> &DrawingStyle {
        &self.style
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Whether the record has expired as of `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Vec2};

    fn stroke() -> Geometry {
        Geometry::Stroke(
            StrokeGeometry::new(Point::new(5.0, 5.0), vec![Vec2::ZERO, Vec2::new(3.0, 4.0)])
                .unwrap(),
        )
    }

    #[test]
    fn test_generated_ids_unique() {
        assert_ne!(DrawingId::generate(), DrawingId::generate());
    }

    #[test]
    fn test_remote_id_must_not_be_blank() {
        assert_eq!(DrawingId::from_remote("  "), Err(RecordError::EmptyId));
        assert_eq!(DrawingId::from_remote("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_record_requires_owner_and_width() {
        let id = DrawingId::generate();
        let no_owner = DrawingRecord::new(
            id.clone(),
            "",
            "",
            stroke(),
            DrawingStyle::default(),
            Timestamp::ZERO,
            None,
        );
        assert_eq!(no_owner, Err(RecordError::EmptyOwner));

        let style = DrawingStyle { width: 0, ..DrawingStyle::default() };
        let no_width = DrawingRecord::new(id, "a", "A", stroke(), style, Timestamp::ZERO, None);
        assert_eq!(no_width, Err(RecordError::ZeroWidth));
    }

    #[test]
    fn test_expiry() {
        let record = DrawingRecord::new(
            DrawingId::generate(),
            "a",
            "A",
            stroke(),
            DrawingStyle::default(),
            Timestamp::from_millis(0),
            Some(Timestamp::from_millis(100)),
        )
        .unwrap();
        assert!(!record.is_expired(Timestamp::from_millis(99)));
        assert!(record.is_expired(Timestamp::from_millis(100)));
        assert_eq!(record.kind(), DrawingKind::Stroke);
    }

    #[test]
    fn test_never_expiring_record() {
        let record = DrawingRecord::new(
            DrawingId::generate(),
            "a",
            "A",
            stroke(),
            DrawingStyle::default(),
            Timestamp::ZERO,
            None,
        )
        .unwrap();
        assert!(!record.is_expired(Timestamp::from_millis(u64::MAX)));
    }

    #[test]
    fn test_texture_cycle() {
        let mut texture = LineTexture::Solid;
        for _ in 0..3 {
            texture = texture.next();
        }
        assert_eq!(texture, LineTexture::Solid);
    }
}
