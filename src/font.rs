//! Font metrics: the glyph aspect ratio that sizes the grid's rows.

use fontdue::{Font, FontSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ascii::DEFAULT_FONT_ASPECT_RATIO;
use crate::error::{Error, Result};

/// Font description used for metrics and canvas rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FontSpec {
    /// TTF/OTF file. Without one, metrics fall back to a fixed ratio.
    pub path: Option<PathBuf>,
    /// Pixel size (em height).
    pub size: f32,
    /// Line height as a multiple of `size`.
    pub line_height: f32,
    /// Extra horizontal advance per glyph, in pixels.
    pub letter_spacing: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            path: None,
            size: 12.0,
            line_height: 1.0,
            letter_spacing: 0.0,
        }
    }
}

impl FontSpec {
    /// Height of one text row in pixels.
    pub fn cell_height(&self) -> f32 {
        (self.size * self.line_height).max(1.0)
    }
}

/// Anything that can report glyph width / glyph height for a font.
pub trait GlyphMetrics {
    fn aspect_ratio(&self, spec: &FontSpec) -> f32;
}

/// A constant ratio, for callers without a font file.
#[derive(Debug, Clone, Copy)]
pub struct FixedAspect(pub f32);

impl Default for FixedAspect {
    fn default() -> Self {
        Self(DEFAULT_FONT_ASPECT_RATIO)
    }
}

impl GlyphMetrics for FixedAspect {
    fn aspect_ratio(&self, _spec: &FontSpec) -> f32 {
        sanitize(self.0)
    }
}

/// Metrics measured from a loaded font with `fontdue`.
pub struct FontdueMetrics {
    font: Font,
}

impl FontdueMetrics {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| Error::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Horizontal advance of one cell in pixels (monospace `M` plus spacing).
    pub fn cell_width(&self, spec: &FontSpec) -> f32 {
        let advance = self.font.metrics('M', spec.size).advance_width;
        (advance + spec.letter_spacing).max(1.0)
    }
}

impl GlyphMetrics for FontdueMetrics {
    fn aspect_ratio(&self, spec: &FontSpec) -> f32 {
        sanitize(self.cell_width(spec) / spec.cell_height())
    }
}

fn sanitize(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        DEFAULT_FONT_ASPECT_RATIO
    }
}
