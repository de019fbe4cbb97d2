//! Color normalization.
//!
//! Hosts hand us colors as packed integers, hex strings or structured channel
//! objects. They are normalized once, at the boundary, into [`RgbColor`] plus a
//! separate alpha byte; nothing past this module looks at the host encoding.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque RGB color (8 bits per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// `#rrggbb` form used on the wire.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a hex color, ignoring any alpha component.
    pub fn from_hex(hex: &str) -> Option<Self> {
        parse_hex(hex).map(|(rgb, _)| rgb)
    }

    /// Convert to a peniko color with the given alpha (0.0 ..= 1.0).
    pub fn with_alpha(self, alpha: f32) -> Color {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::from_rgba8(self.r, self.g, self.b, a)
    }

    /// Fully opaque peniko color.
    pub fn opaque(self) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, 255)
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for RgbColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b)
    }
}

/// A color in whatever encoding the host uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostColor {
    /// `0xRRGGBB` packed into an integer. Bits above 24 are ignored.
    Packed(u32),
    /// `#rgb`, `#rrggbb`, `#rrggbbaa`, with or without the `#`, or `0x` prefixed.
    Hex(String),
    /// Structured channels. Values all within `0.0..=1.0` are read as unit
    /// floats, anything larger as `0..=255`.
    Channels {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default)]
        a: Option<f64>,
    },
}

impl HostColor {
    /// Normalize into an RGB color and alpha byte. `None` if unparseable.
    pub fn normalize(&self) -> Option<(RgbColor, u8)> {
        match self {
            HostColor::Packed(value) => {
                let value = value & 0x00ff_ffff;
                let rgb = RgbColor::new((value >> 16) as u8, (value >> 8) as u8, value as u8);
                Some((rgb, 255))
            }
            HostColor::Hex(hex) => parse_hex(hex),
            HostColor::Channels { r, g, b, a } => {
                let channels = [*r, *g, *b];
                if channels.iter().any(|c| !c.is_finite() || *c < 0.0) {
                    return None;
                }
                let unit = channels.iter().all(|c| *c <= 1.0);
                let to_byte = |c: f64| {
                    let scaled = if unit { c * 255.0 } else { c };
                    scaled.round().clamp(0.0, 255.0) as u8
                };
                let alpha = match a {
                    Some(a) if a.is_finite() => (a.clamp(0.0, 1.0) * 255.0).round() as u8,
                    Some(_) => return None,
                    None => 255,
                };
                Some((RgbColor::new(to_byte(*r), to_byte(*g), to_byte(*b)), alpha))
            }
        }
    }
}

impl From<RgbColor> for HostColor {
    fn from(color: RgbColor) -> Self {
        HostColor::Hex(color.to_hex())
    }
}

fn parse_hex(input: &str) -> Option<(RgbColor, u8)> {
    let digits = input
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|n| n * 17);
    match digits.len() {
        3 => Some((RgbColor::new(nibble(0)?, nibble(1)?, nibble(2)?), 255)),
        6 => Some((RgbColor::new(byte(0)?, byte(2)?, byte(4)?), 255)),
        8 => Some((RgbColor::new(byte(0)?, byte(2)?, byte(4)?), byte(6)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_integer() {
        let (rgb, alpha) = HostColor::Packed(0xff8000).normalize().unwrap();
        assert_eq!(rgb, RgbColor::new(255, 128, 0));
        assert_eq!(alpha, 255);
    }

    #[test]
    fn test_packed_ignores_high_bits() {
        let (rgb, _) = HostColor::Packed(0xab_00_00_ff).normalize().unwrap();
        assert_eq!(rgb, RgbColor::new(0, 0, 255));
    }

    #[test]
    fn test_hex_forms() {
        let six = HostColor::Hex("#336699".into()).normalize().unwrap();
        let bare = HostColor::Hex("336699".into()).normalize().unwrap();
        let short = HostColor::Hex("#369".into()).normalize().unwrap();
        let prefixed = HostColor::Hex("0x336699".into()).normalize().unwrap();
        assert_eq!(six.0, RgbColor::new(0x33, 0x66, 0x99));
        assert_eq!(six, bare);
        assert_eq!(six, short);
        assert_eq!(six, prefixed);
    }

    #[test]
    fn test_hex_with_alpha() {
        let (rgb, alpha) = HostColor::Hex("#10203080".into()).normalize().unwrap();
        assert_eq!(rgb, RgbColor::new(0x10, 0x20, 0x30));
        assert_eq!(alpha, 0x80);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(HostColor::Hex("#12".into()).normalize().is_none());
        assert!(HostColor::Hex("#zzzzzz".into()).normalize().is_none());
        assert!(HostColor::Hex("".into()).normalize().is_none());
    }

    #[test]
    fn test_unit_channels() {
        let color = HostColor::Channels { r: 1.0, g: 0.5, b: 0.0, a: Some(0.5) };
        let (rgb, alpha) = color.normalize().unwrap();
        assert_eq!(rgb, RgbColor::new(255, 128, 0));
        assert_eq!(alpha, 128);
    }

    #[test]
    fn test_byte_channels() {
        let color = HostColor::Channels { r: 200.0, g: 10.0, b: 1.0, a: None };
        let (rgb, alpha) = color.normalize().unwrap();
        assert_eq!(rgb, RgbColor::new(200, 10, 1));
        assert_eq!(alpha, 255);
    }

    #[test]
    fn test_non_finite_channels_rejected() {
        let color = HostColor::Channels { r: f64::NAN, g: 0.0, b: 0.0, a: None };
        assert!(color.normalize().is_none());
    }

    #[test]
    fn test_deserialize_any_encoding() {
        let packed: HostColor = serde_json::from_str("16711680").unwrap();
        let hex: HostColor = serde_json::from_str("\"#00ff00\"").unwrap();
        let channels: HostColor = serde_json::from_str(r#"{"r":0,"g":0,"b":1}"#).unwrap();
        assert_eq!(packed.normalize().unwrap().0, RgbColor::new(255, 0, 0));
        assert_eq!(hex.normalize().unwrap().0, RgbColor::new(0, 255, 0));
        assert_eq!(channels.normalize().unwrap().0, RgbColor::new(0, 0, 255));
    }

    #[test]
    fn test_hex_roundtrip_through_wire_form() {
        let color = RgbColor::new(1, 2, 254);
        assert_eq!(color.to_hex(), "#0102fe");
        assert_eq!(RgbColor::from_hex(&color.to_hex()), Some(color));
    }
}
