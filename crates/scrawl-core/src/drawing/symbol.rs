//! Stamped symbol geometry.

use super::RecordError;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// The fixed set of stampable glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolType {
    Plus,
    Cross,
    Dot,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    RoundedSquare,
}

impl SymbolType {
    pub const ALL: [SymbolType; 8] = [
        SymbolType::Plus,
        SymbolType::Cross,
        SymbolType::Dot,
        SymbolType::ArrowUp,
        SymbolType::ArrowDown,
        SymbolType::ArrowLeft,
        SymbolType::ArrowRight,
        SymbolType::RoundedSquare,
    ];

    /// Clockwise quarter turns from the upward arrow, for arrow variants.
    pub fn quarter_turns(self) -> Option<u8> {
        match self {
            SymbolType::ArrowUp => Some(0),
            SymbolType::ArrowRight => Some(1),
            SymbolType::ArrowDown => Some(2),
            SymbolType::ArrowLeft => Some(3),
            _ => None,
        }
    }
}

/// Size class of a stamped symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl SymbolSize {
    /// Side length of the square the symbol fits in, in pixels.
    pub fn side(self) -> f64 {
        match self {
            SymbolSize::Small => 24.0,
            SymbolSize::Medium => 40.0,
            SymbolSize::Large => 64.0,
        }
    }
}

/// A glyph stamped at a single point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SymbolGeometry {
    at: Point,
    symbol: SymbolType,
    size: SymbolSize,
}

impl SymbolGeometry {
    pub fn new(at: Point, symbol: SymbolType, size: SymbolSize) -> Result<Self, RecordError> {
        if !at.is_finite() {
            return Err(RecordError::NonFinite);
        }
        let geometry = Self { at, symbol, size };
        if !geometry.bounds().is_finite() {
            return Err(RecordError::NonFinite);
        }
        Ok(geometry)
    }

    /// Center of the symbol.
    pub fn at(&self) -> Point {
        self.at
    }

    pub fn symbol(&self) -> SymbolType {
        self.symbol
    }

    pub fn size(&self) -> SymbolSize {
        self.size
    }

    /// The square the glyph is drawn in.
    pub fn bounds(&self) -> Rect {
        let half = self.size.side() / 2.0;
        Rect::new(self.at.x - half, self.at.y - half, self.at.x + half, self.at.y + half)
    }
}
