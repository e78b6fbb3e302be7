//! Error types for glyphgrid.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the rendering pipeline and its inputs.
///
/// Palette problems never show up here: an unknown or empty palette is
/// replaced by a fallback instead of failing the render.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load image '{}': {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid RGBA buffer: expected {expected} bytes for {width}x{height}, got {actual}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Worker error: {0}")]
    Worker(String),
    #[error("Invalid color '{0}': expected #rgb, #rrggbb or #rrggbbaa")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, Error>;
