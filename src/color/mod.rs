//! sRGB colors and WCAG luminance math.
//!
//! Colors serialize as `#RRGGBB` strings; parsing also accepts `#RGB` and a
//! missing `#`.

use serde::{Deserialize, Serialize};
use std::fmt;

mod contrast;

pub use contrast::{BackgroundTone, ContrastAnalyzer, ContrastConfig, ContrastDecision};

/// 8-bit sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB`, `#RGB` (with or without `#`, any case).
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                    let v = ch.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self::rgb(out[0], out[1], out[2]))
            }
            _ => None,
        }
    }

    /// Formats as uppercase `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// WCAG relative luminance in `[0, 1]`.
    pub fn relative_luminance(&self) -> f64 {
        relative_luminance(f64::from(self.r), f64::from(self.g), f64::from(self.b))
    }

    /// WCAG contrast ratio against another color, in `[1, 21]`.
    pub fn contrast_with(&self, other: &Color) -> f64 {
        contrast_ratio(self.relative_luminance(), other.relative_luminance())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse_hex(&value).ok_or_else(|| format!("invalid hex color: {value:?}"))
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

/// Gamma-linearizes one sRGB channel given in `[0, 255]`.
pub fn linearize_channel(value: f64) -> f64 {
    let c = (value / 255.0).clamp(0.0, 1.0);
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance for channels in `[0, 255]` (fractional allowed, so
/// averaged samples need no rounding).
pub fn relative_luminance(r: f64, g: f64, b: f64) -> f64 {
    0.2126 * linearize_channel(r) + 0.7152 * linearize_channel(g) + 0.0722 * linearize_channel(b)
}

/// WCAG contrast ratio between two relative luminances.
pub fn contrast_ratio(l1: f64, l2: f64) -> f64 {
    let hi = l1.max(l2);
    let lo = l1.min(l2);
    (hi + 0.05) / (lo + 0.05)
}

#[cfg(test)]
mod tests {
    use super::{contrast_ratio, Color};

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Color::parse_hex("#1a2B3c"), Some(Color::rgb(0x1A, 0x2B, 0x3C)));
        assert_eq!(Color::parse_hex("fff"), Some(Color::WHITE));
        assert_eq!(Color::parse_hex("#12345"), None);
        assert_eq!(Color::parse_hex("#gg0000"), None);
    }

    #[test]
    fn hex_output_is_uppercase() {
        assert_eq!(Color::rgb(171, 205, 239).to_hex(), "#ABCDEF");
    }

    #[test]
    fn luminance_extremes() {
        assert_eq!(Color::BLACK.relative_luminance(), 0.0);
        assert!((Color::WHITE.relative_luminance() - 1.0).abs() < 1e-12);
        assert!((contrast_ratio(0.3, 0.3) - 1.0).abs() < 1e-12);
    }
}
