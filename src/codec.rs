use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::color::Palette;
use crate::pixels::PixelBuffer;

/// Lay the palette out as a single row, one pixel per entry.
pub fn encode(palette: &Palette) -> PixelBuffer {
    PixelBuffer::single_row(palette.colors().to_vec())
}

/// Read row 0 of a palette artifact, left to right.
///
/// Rows below the first are ignored and entries are not deduplicated.
pub fn decode(artifact: &PixelBuffer) -> Palette {
    Palette::from_colors(artifact.row(0).to_vec())
}

// ------------------------------------------------------------
// In-memory image bytes
// ------------------------------------------------------------

pub(crate) fn decode_image_bytes(bytes: &[u8]) -> image::ImageResult<PixelBuffer> {
    let img = image::load_from_memory(bytes)?;
    Ok(PixelBuffer::from(img.to_rgba8()))
}

pub(crate) fn encode_image_bytes(buffer: &PixelBuffer, format: ImageFormat) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buf);
        DynamicImage::ImageRgba8(buffer.to_rgba_image()).write_to(&mut cursor, format)?;
    }
    Ok(buf)
}
