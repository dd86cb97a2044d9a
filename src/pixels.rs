use image::{Rgba, RgbaImage};

use crate::color::Color;

/// Width × height grid of colors, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Build a buffer from row-major pixels. Returns `None` when the pixel
    /// count does not match the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?;
        (pixels.len() == expected).then_some(Self { width, height, pixels })
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// A single row holding `pixels` left to right.
    ///
    /// Entries beyond `u32::MAX` cannot be addressed and are dropped.
    pub(crate) fn single_row(mut pixels: Vec<Color>) -> Self {
        let width = u32::try_from(pixels.len()).unwrap_or(u32::MAX);
        pixels.truncate(width as usize);
        Self { width, height: 1, pixels }
    }

    /// Same dimensions as `self`, each pixel replaced by `f(pixel)`.
    pub(crate) fn try_map<E>(&self, mut f: impl FnMut(Color) -> Result<Color, E>) -> Result<Self, E> {
        let pixels = self.pixels.iter().map(|&px| f(px)).collect::<Result<Vec<_>, E>>()?;
        Ok(Self {
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Row-major view of every pixel.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Pixels of row `y`, left to right. Empty when `y` is out of range.
    pub fn row(&self, y: u32) -> &[Color] {
        if y >= self.height {
            return &[];
        }
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// Iterate column by column: x outer, y inner.
    pub fn iter_column_major(&self) -> impl Iterator<Item = Color> + '_ {
        let w = self.width as usize;
        (0..w).flat_map(move |x| self.pixels.iter().skip(x).step_by(w.max(1)).copied())
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let w = self.width as usize;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            Rgba(self.pixels[y as usize * w + x as usize].as_array())
        })
    }
}

impl From<&RgbaImage> for PixelBuffer {
    fn from(img: &RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            pixels: img.pixels().map(|px| Color::from(*px)).collect(),
        }
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        Self::from(&img)
    }
}
