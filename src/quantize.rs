use std::collections::HashMap;

use tracing::debug;

use crate::color::{Color, Palette, distance};
use crate::error::{ConvertError, Result};
use crate::pixels::PixelBuffer;

/// Closest palette entry to `color` by RGB Manhattan distance.
///
/// Only a strictly smaller distance replaces the current best, so among
/// equally close entries the one with the lowest index wins. Returns `None`
/// for an empty palette.
pub fn nearest(color: Color, palette: &Palette) -> Option<Color> {
    let mut best: Option<(u32, Color)> = None;

    for &entry in palette.iter() {
        let d = distance(color, entry);
        if best.is_none_or(|(best_d, _)| d < best_d) {
            best = Some((d, entry));
            if d == 0 {
                break;
            }
        }
    }

    best.map(|(_, entry)| entry)
}

/// Remap every pixel of `source` to its nearest palette color.
///
/// Pixels with alpha 0 become [`Color::TRANSPARENT`] without looking at the
/// palette. Any other pixel is replaced by the whole matched entry, alpha
/// included. The output has the same dimensions as `source`.
pub fn quantize(source: &PixelBuffer, palette: &Palette) -> Result<PixelBuffer> {
    if palette.is_empty() {
        return Err(ConvertError::EmptyPalette);
    }

    // Images usually repeat a small set of colors.
    let mut matches: HashMap<Color, Color> = HashMap::new();

    let out = source.try_map(|px| -> Result<Color> {
        if px.is_transparent() {
            return Ok(Color::TRANSPARENT);
        }
        if let Some(&c) = matches.get(&px) {
            return Ok(c);
        }
        let c = nearest(px, palette).ok_or(ConvertError::EmptyPalette)?;
        matches.insert(px, c);
        Ok(c)
    })?;

    debug!(
        width = source.width(),
        height = source.height(),
        palette = palette.len(),
        unique = matches.len(),
        "quantized image"
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bw() -> Palette {
        Palette::from_colors(vec![Color::opaque(0, 0, 0), Color::opaque(255, 255, 255)])
    }

    #[test]
    fn picks_closest_entry() {
        assert_eq!(nearest(Color::opaque(100, 100, 100), &bw()), Some(Color::opaque(0, 0, 0)));
        assert_eq!(nearest(Color::opaque(200, 180, 140), &bw()), Some(Color::opaque(255, 255, 255)));
    }

    #[test]
    fn first_entry_wins_ties() {
        let dup = Color::opaque(50, 50, 50);
        let palette = Palette::from_colors(vec![dup, dup]);
        assert_eq!(nearest(Color::opaque(60, 60, 60), &palette), Some(dup));

        // Equidistant but distinguishable entries: 30 either way.
        let lo = Color::new(40, 40, 40, 255);
        let hi = Color::new(60, 60, 60, 200);
        let palette = Palette::from_colors(vec![hi, lo]);
        assert_eq!(nearest(Color::opaque(50, 50, 50), &palette), Some(hi));
        let palette = Palette::from_colors(vec![lo, hi]);
        assert_eq!(nearest(Color::opaque(50, 50, 50), &palette), Some(lo));
    }

    #[test]
    fn nearest_in_empty_palette() {
        assert_eq!(nearest(Color::opaque(1, 2, 3), &Palette::default()), None);
    }

    #[test]
    fn transparent_pixels_stay_transparent() {
        let src = PixelBuffer::from_pixels(
            2,
            1,
            vec![Color::new(0, 0, 0, 0), Color::new(255, 255, 255, 0)],
        )
        .unwrap();
        let out = quantize(&src, &bw()).unwrap();
        assert_eq!(out.pixels(), &[Color::TRANSPARENT, Color::TRANSPARENT]);
    }

    #[test]
    fn output_takes_palette_alpha() {
        let palette = Palette::from_colors(vec![Color::new(255, 0, 0, 100)]);
        let src = PixelBuffer::from_pixels(1, 1, vec![Color::new(250, 5, 5, 7)]).unwrap();
        let out = quantize(&src, &palette).unwrap();
        assert_eq!(out.pixels(), &[Color::new(255, 0, 0, 100)]);
    }

    #[test]
    fn keeps_dimensions() {
        let src = PixelBuffer::filled(7, 3, Color::opaque(100, 100, 100));
        let out = quantize(&src, &bw()).unwrap();
        assert_eq!((out.width(), out.height()), (7, 3));
        assert!(out.pixels().iter().all(|&c| c == Color::opaque(0, 0, 0)));
    }

    #[test]
    fn empty_palette_is_rejected() {
        let src = PixelBuffer::filled(2, 2, Color::opaque(9, 9, 9));
        let before = src.clone();
        assert!(matches!(quantize(&src, &Palette::default()), Err(ConvertError::EmptyPalette)));
        assert_eq!(src, before);
    }

    #[test]
    fn zero_sized_source_is_fine() {
        let src = PixelBuffer::filled(0, 0, Color::default());
        let out = quantize(&src, &bw()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn quantizing_twice_changes_nothing() {
        let palette = Palette::from_colors(vec![
            Color::opaque(0, 0, 0),
            Color::opaque(255, 0, 0),
            Color::opaque(0, 0, 255),
            Color::new(255, 255, 255, 128),
        ]);
        let px: Vec<Color> = (0..100u32)
            .map(|i| {
                let v = (i * 37 % 256) as u8;
                let a = if i % 9 == 0 { 0 } else { 255 };
                Color::new(v, v.wrapping_mul(3), v.wrapping_add(90), a)
            })
            .collect();
        let src = PixelBuffer::from_pixels(10, 10, px).unwrap();
        let once = quantize(&src, &palette).unwrap();
        let twice = quantize(&once, &palette).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn matches_exhaustive_search() {
        let palette = Palette::from_colors(
            (0..12u8)
                .map(|i| Color::opaque(i.wrapping_mul(21), i.wrapping_mul(47), i.wrapping_mul(93)))
                .collect(),
        );
        for r in (0..=255u8).step_by(51) {
            for g in (0..=255u8).step_by(85) {
                for b in (0..=255u8).step_by(17) {
                    let c = Color::opaque(r, g, b);
                    let got = nearest(c, &palette).unwrap();
                    let min = palette.iter().map(|&e| distance(c, e)).min().unwrap();
                    let first = palette.iter().copied().find(|&e| distance(c, e) == min).unwrap();
                    assert_eq!(got, first);
                }
            }
        }
    }
}
