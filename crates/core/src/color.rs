//! Tag colors and their translucent overlay variants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default alpha for highlight fills
pub const FILL_OPACITY: f32 = 0.25;

/// Default alpha for highlight borders
pub const BORDER_OPACITY: f32 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color '{0}' must be a #RRGGBB hex string")]
    InvalidHex(String),
    #[error("opacity {0} is outside 0.0..=1.0")]
    InvalidOpacity(String),
}

/// Opaque RGB base color, serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` (or bare `RRGGBB`) hex string
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let clean = hex.trim().trim_start_matches('#');
        if clean.len() != 6 || !clean.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&clean[range], 16).map_err(|_| ColorError::InvalidHex(hex.to_string()))
        };

        Ok(Self { r: channel(0..2)?, g: channel(2..4)?, b: channel(4..6)? })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// CSS `rgba(r, g, b, a)` string at the given alpha
    pub fn to_rgba_css(&self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Fill and border strings baked into a highlight at commit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair {
    pub fill: String,
    pub border: String,
}

/// Resolve a base color with the default overlay opacities
pub fn resolve_color(base: Color) -> ColorPair {
    resolve_color_with(base, FILL_OPACITY, BORDER_OPACITY)
}

/// Resolve a base color into fill and border strings.
///
/// Output is a pure function of the inputs, so the same base color always
/// produces byte-identical strings.
pub fn resolve_color_with(base: Color, fill_opacity: f32, border_opacity: f32) -> ColorPair {
    ColorPair { fill: base.to_rgba_css(fill_opacity), border: base.to_rgba_css(border_opacity) }
}

/// Validate an opacity value
pub fn check_opacity(value: f32) -> Result<f32, ColorError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ColorError::InvalidOpacity(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_accepts_with_and_without_hash() {
        assert_eq!(Color::from_hex("#FF3A3A").unwrap(), Color::rgb(255, 58, 58));
        assert_eq!(Color::from_hex("65dc65").unwrap(), Color::rgb(101, 220, 101));
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert!(matches!(Color::from_hex("#FFF"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Color::from_hex("#GG0000"), Err(ColorError::InvalidHex(_))));
    }

    #[test]
    fn test_resolve_color_defaults() {
        let pair = resolve_color(Color::from_hex("#FFD747").unwrap());
        assert_eq!(pair.fill, "rgba(255, 215, 71, 0.25)");
        assert_eq!(pair.border, "rgba(255, 215, 71, 0.9)");
    }

    #[test]
    fn test_resolve_color_is_deterministic() {
        let base = Color::rgb(101, 119, 255);
        assert_eq!(resolve_color_with(base, 0.4, 1.0), resolve_color_with(base, 0.4, 1.0));
        assert_eq!(resolve_color_with(base, 0.4, 1.0).border, "rgba(101, 119, 255, 1)");
    }

    #[test]
    fn test_color_serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(177, 122, 254)).unwrap();
        assert_eq!(json, "\"#B17AFE\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(177, 122, 254));
    }

    #[test]
    fn test_check_opacity_bounds() {
        assert!(check_opacity(0.0).is_ok());
        assert!(check_opacity(1.0).is_ok());
        assert!(check_opacity(1.5).is_err());
    }
}
