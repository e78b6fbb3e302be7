//! RGB to luminance conversion and photometric correction.

/// Contrast is clamped to this magnitude so the contrast factor's
/// denominator `259 - contrast` never reaches zero.
pub const MAX_CONTRAST: f32 = 258.0;

/// Per-pixel correction applied after luminance extraction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Photometric {
    pub invert: bool,
    /// Signed offset added after contrast.
    pub brightness: f32,
    /// Signed contrast; 0 is the identity.
    pub contrast: f32,
}

impl Photometric {
    /// Multiplicative factor `259(c + 255) / (255(259 - c))`.
    ///
    /// Returns exactly 1.0 for zero contrast.
    pub fn contrast_factor(&self) -> f32 {
        let c = finite_or_zero(self.contrast).clamp(-MAX_CONTRAST, MAX_CONTRAST);
        if c == 0.0 {
            return 1.0;
        }
        259.0 * (c + 255.0) / (255.0 * (259.0 - c))
    }

    /// Apply inversion, contrast and brightness to one luminance value.
    #[inline]
    pub fn apply(&self, luminance: f32, factor: f32) -> f32 {
        let mut l = finite_or_zero(luminance);
        if self.invert {
            l = 255.0 - l;
        }
        // Skip the pivot round-trip for unit contrast so the identity is exact.
        if factor != 1.0 {
            l = factor * (l - 128.0) + 128.0;
        }
        (l + finite_or_zero(self.brightness)).clamp(0.0, 255.0)
    }
}

/// ITU-R BT.601 luminance: `0.299 R + 0.587 G + 0.114 B`.
///
/// Coefficients are scaled by 1000 and summed as integers, so grey inputs
/// come back exactly (pure white is exactly 255.0).
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    (299 * r as u32 + 587 * g as u32 + 114 * b as u32) as f32 / 1000.0
}

/// Row-major luminance values for one grid, in `[0, 255]`.
///
/// `working` is mutated by error-diffusion dithering; `original` keeps the
/// sampled values so the ignore-white test sees pre-dither luminance.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceBuffer {
    pub width: u32,
    pub height: u32,
    pub original: Vec<f32>,
    pub working: Vec<f32>,
}

impl LuminanceBuffer {
    /// Build a buffer from already-normalized values.
    ///
    /// Values are clamped to `[0, 255]`; the length must equal
    /// `width * height` (shorter input is padded with black).
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> Self {
        let len = width as usize * height as usize;
        let mut original: Vec<f32> = values
            .into_iter()
            .take(len)
            .map(|v| finite_or_zero(v).clamp(0.0, 255.0))
            .collect();
        original.resize(len, 0.0);
        Self {
            width,
            height,
            working: original.clone(),
            original,
        }
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

/// Convert an RGBA sample buffer into a normalized luminance buffer.
///
/// Alpha is ignored; the rasterizer has already composited onto an opaque
/// background.
pub fn normalize(rgba: &[u8], width: u32, height: u32, params: &Photometric) -> LuminanceBuffer {
    let factor = params.contrast_factor();
    let values = rgba
        .chunks_exact(4)
        .map(|px| params.apply(luminance(px[0], px[1], px[2]), factor))
        .collect();
    LuminanceBuffer::from_values(width, height, values)
}

#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
