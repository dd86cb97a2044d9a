use std::str::FromStr;

use image::Rgba;
use palette::{Srgb, Srgba};

use crate::error::{ConvertError, Result};

/// A straight (non-premultiplied) RGBA color with 8 bits per channel.
///
/// Two colors are equal only when all four channels match, so `(0,0,0,0)`
/// and `(255,255,255,0)` are distinct even though both are invisible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Output value for every fully transparent source pixel.
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    #[inline(always)]
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn as_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `RRGGBBAA`, upper-case, no leading `#`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

/// Manhattan distance over the red, green and blue channels.
///
/// Alpha is ignored; the result is in `0..=765`.
#[inline(always)]
pub fn distance(a: Color, b: Color) -> u32 {
    u32::from(a.r.abs_diff(b.r)) + u32::from(a.g.abs_diff(b.g)) + u32::from(a.b.abs_diff(b.b))
}

/// Ordered list of colors that images are remapped onto.
///
/// Palettes built by [`extract`](crate::extract) never hold duplicates.
/// Palettes decoded from an artifact are taken as-is; when two entries are
/// equally close to a pixel the lower index wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn from_colors(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Parse `RRGGBB` or `RRGGBBAA` strings, with or without a leading `#`.
    /// Six-digit colors are opaque.
    pub fn from_hex<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let colors = values
            .iter()
            .map(|v| parse_hex(v.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.colors.iter()
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.colors.iter().map(Color::to_hex).collect()
    }
}

fn parse_hex(value: &str) -> Result<Color> {
    let invalid = |reason: String| ConvertError::InvalidColor {
        value: value.to_string(),
        reason,
    };

    let hex = value.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("not a hex number".into()));
    }
    let (rgb, alpha) = match hex.len() {
        6 => (hex, None),
        8 => {
            let (rgb, a) = hex.split_at(6);
            (rgb, Some(a))
        }
        n => return Err(invalid(format!("expected 6 or 8 hex digits, got {n}"))),
    };

    let rgb = Srgb::<u8>::from_str(rgb).map_err(|e| invalid(e.to_string()))?;
    let a = match alpha {
        Some(a) => u8::from_str_radix(a, 16).map_err(|e| invalid(e.to_string()))?,
        None => 255,
    };
    Ok(Color::new(rgb.red, rgb.green, rgb.blue, a))
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<Rgba<u8>> for Color {
    fn from(px: Rgba<u8>) -> Self {
        Self::from(px.0)
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba(c.as_array())
    }
}

impl From<Srgba<u8>> for Color {
    fn from(c: Srgba<u8>) -> Self {
        Self::new(c.red, c.green, c.blue, c.alpha)
    }
}

impl From<Color> for Srgba<u8> {
    fn from(c: Color) -> Self {
        Srgba::new(c.r, c.g, c.b, c.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_ignores_alpha() {
        let a = Color::new(10, 20, 30, 0);
        let b = Color::new(10, 20, 30, 255);
        assert_eq!(distance(a, b), 0);
    }

    #[test]
    fn distance_is_l1_over_rgb() {
        let gray = Color::opaque(100, 100, 100);
        assert_eq!(distance(gray, Color::opaque(0, 0, 0)), 300);
        assert_eq!(distance(gray, Color::opaque(255, 255, 255)), 465);
        assert_eq!(distance(Color::opaque(0, 0, 0), Color::opaque(255, 255, 255)), 765);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Color::new(3, 200, 17, 9);
        let b = Color::new(250, 1, 18, 200);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn hex_includes_alpha() {
        assert_eq!(Color::new(0x12, 0xAB, 0x00, 0xFF).to_hex(), "12AB00FF");
    }

    #[test]
    fn parses_hex_palettes() {
        let p = Palette::from_hex(&["#FF8000", "00ff0080", " 102030 "]).unwrap();
        assert_eq!(
            p.colors(),
            &[
                Color::opaque(255, 128, 0),
                Color::new(0, 255, 0, 128),
                Color::opaque(16, 32, 48),
            ]
        );
        assert_eq!(p.to_hex()[1], "00FF0080");
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(matches!(
            Palette::from_hex(&["#FFF0"]),
            Err(ConvertError::InvalidColor { .. })
        ));
        assert!(Palette::from_hex(&["GG0000"]).is_err());
        assert!(Palette::from_hex(&["0000ZZ"]).is_err());
    }

    #[test]
    fn rejects_non_ascii_hex() {
        for value in ["0é000", "0é000FF", "#ÿÿÿ", "FFFFFFé"] {
            assert!(
                matches!(Palette::from_hex(&[value]), Err(ConvertError::InvalidColor { .. })),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn converts_through_image_and_palette_types() {
        let c = Color::new(1, 2, 3, 4);
        assert_eq!(Color::from(Rgba::<u8>::from(c)), c);
        assert_eq!(Color::from(Srgba::<u8>::from(c)), c);
    }
}
