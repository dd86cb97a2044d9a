use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::{debug, warn};

use crate::codec;
use crate::color::Palette;
use crate::error::{ConvertError, Result};
use crate::pixels::PixelBuffer;

/// Decode any supported image file into straight RGBA pixels.
pub fn read_pixels(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path).map_err(|source| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PixelBuffer::from(img.to_rgba8()))
}

/// Encode `buffer` to `path`.
///
/// The image is written to a hidden sibling file first and renamed over
/// `path` once encoding succeeded, so a failed write leaves nothing behind.
pub fn write_pixels(buffer: &PixelBuffer, path: &Path, format: ImageFormat) -> Result<()> {
    let tmp = staging_path(path);

    if let Err(source) = buffer.to_rgba_image().save_with_format(&tmp, format) {
        let _ = fs::remove_file(&tmp);
        return Err(ConvertError::Encode {
            path: path.to_path_buf(),
            source,
        });
    }

    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        ConvertError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!(path = %path.display(), width = buffer.width(), height = buffer.height(), "image written");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

/// Read a palette artifact from disk.
pub fn load_palette(path: &Path) -> Result<Palette> {
    let img = image::open(path).map_err(|source| ConvertError::PaletteNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(codec::decode(&PixelBuffer::from(img.to_rgba8())))
}

/// Like [`load_palette`], but an unreadable artifact yields an empty palette.
///
/// The quantizer rejects empty palettes, so callers still stop before any
/// conversion happens.
pub fn load_palette_or_empty(path: &Path) -> Palette {
    match load_palette(path) {
        Ok(palette) => palette,
        Err(e) => {
            warn!(error = %e, "no usable palette");
            Palette::default()
        }
    }
}

/// Write `palette` as a single-row artifact.
pub fn save_palette(palette: &Palette, path: &Path, format: ImageFormat) -> Result<()> {
    if palette.is_empty() {
        return Err(ConvertError::EmptyPalette);
    }
    write_pixels(&codec::encode(palette), path, format)
}
