use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unable to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("palette {path} could not be read, create a palette first: {source}")]
    PaletteNotFound {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("palette has no colors")]
    EmptyPalette,

    #[error("unable to write image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no colors could be found, the image has no pixels")]
    EmptySource,

    #[error("invalid palette color {value:?}: {reason}")]
    InvalidColor { value: String, reason: String },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
