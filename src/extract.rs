use std::collections::HashSet;

use tracing::debug;

use crate::color::{Color, Palette};
use crate::error::{ConvertError, Result};
use crate::pixels::PixelBuffer;

/// Collect the distinct colors of `image` in first-occurrence order.
///
/// Pixels are visited column by column (x outer, y inner), which fixes the
/// order of the resulting palette. Colors are compared on all four channels
/// and transparent pixels are kept like any other color, so a uniform image
/// yields a one-entry palette.
///
/// Fails with [`ConvertError::EmptySource`] only when the image has no
/// pixels at all.
pub fn extract(image: &PixelBuffer) -> Result<Palette> {
    if image.is_empty() {
        return Err(ConvertError::EmptySource);
    }

    let mut seen: HashSet<Color> = HashSet::new();
    let mut colors: Vec<Color> = Vec::new();

    for pixel in image.iter_column_major() {
        if seen.insert(pixel) {
            colors.push(pixel);
        }
    }

    debug!(
        width = image.width(),
        height = image.height(),
        colors = colors.len(),
        "extracted palette"
    );

    Ok(Palette::from_colors(colors))
}
