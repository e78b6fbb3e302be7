//! Decoded source images and load sequencing.

use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// A decoded RGBA raster. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ImageSource {
    image: RgbaImage,
}

impl ImageSource {
    /// Decode an image file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(image))
    }

    /// Wrap an already-decoded RGBA buffer.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = rgba.len();
        RgbaImage::from_raw(width, height, rgba)
            .map(|image| Self { image })
            .ok_or(Error::InvalidBuffer {
                width,
                height,
                expected,
                actual,
            })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Decode an image file. Shorthand for [`ImageSource::load`].
pub fn load(path: impl AsRef<Path>) -> Result<ImageSource> {
    ImageSource::load(path)
}

/// Hands out load tickets so that only the most recent load is applied.
///
/// In-flight loads are never cancelled; a superseded load simply finishes and
/// is dropped when its ticket is no longer the latest.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    latest: Arc<AtomicU64>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load and return its ticket.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `ticket` is still the most recent load.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Decode `path` off the async runtime.
    ///
    /// Returns `None` when another load was started while this one ran.
    pub async fn load(&self, path: PathBuf) -> Option<Result<ImageSource>> {
        let ticket = self.begin();
        let result = tokio::task::spawn_blocking(move || ImageSource::load(path))
            .await
            .unwrap_or_else(|e| Err(Error::Worker(format!("image load task failed: {}", e))));

        if !self.is_current(ticket) {
            log::debug!("Discarding superseded image load #{}", ticket);
            return None;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_rejects_short_buffer() {
        let err = ImageSource::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::InvalidBuffer { expected: 16, actual: 15, .. }));
    }

    #[test]
    fn test_from_rgba_dimensions() {
        let src = ImageSource::from_rgba(3, 1, vec![255; 12]).unwrap();
        assert_eq!((src.width(), src.height()), (3, 1));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ImageSource::load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }

    #[test]
    fn test_tickets_latest_wins() {
        let loader = SourceLoader::new();
        let first = loader.begin();
        let second = loader.begin();
        assert!(!loader.is_current(first));
        assert!(loader.is_current(second));
    }
}
