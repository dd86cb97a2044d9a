//! Extract the colors of a reference image and remap other images onto them.
//!
//! A palette is the ordered set of distinct RGBA colors of a reference image.
//! It is stored as a one-row PNG and every pixel of a target image is
//! replaced by its nearest palette entry (Manhattan distance over RGB).
//! Fully transparent pixels stay transparent.

pub mod codec;
pub mod color;
pub mod error;
pub mod extract;
pub mod pixels;
pub mod quantize;
pub mod wasm;

#[cfg(not(target_arch = "wasm32"))]
pub mod convert;
#[cfg(not(target_arch = "wasm32"))]
pub mod io;

pub use color::{Color, Palette, distance};
pub use error::{ConvertError, Result};
pub use extract::extract;
pub use pixels::PixelBuffer;
pub use quantize::{nearest, quantize};
