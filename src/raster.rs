//! Rasterizing a source image onto the character grid.
//!
//! The source is resized to exactly one pixel per character cell, blurred,
//! and optionally stamped with a cursor overlay before luminance sampling.

use image::imageops::{self, FilterType};
use image::{Rgba as Pixel, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::source::ImageSource;

/// Shape drawn at the cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    /// Radial fade from opaque at the centre to clear at the edge
    #[default]
    Gradient,
    /// Hard-edged filled disc
    Circle,
    /// A secondary image centred on the cursor
    Image,
}

/// Cursor overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CursorConfig {
    pub style: CursorStyle,
    /// Overlay diameter in grid pixels (one pixel per character column).
    pub width: f32,
    /// Draw white instead of black (and invert the stamp image).
    pub invert: bool,
    /// Spring smoothing, 0 (snappy) to 100 (floaty).
    pub smoothing: f32,
    /// Stamp image for [`CursorStyle::Image`].
    pub image: Option<PathBuf>,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            style: CursorStyle::Gradient,
            width: 20.0,
            invert: false,
            smoothing: 50.0,
            image: None,
        }
    }
}

/// A cursor overlay ready to draw: style plus a resolved position.
///
/// Only build one once the cursor has received at least one event.
#[derive(Debug, Clone, Copy)]
pub struct CursorOverlay<'a> {
    pub style: CursorStyle,
    pub width: f32,
    pub invert: bool,
    /// Fractional position (0..1) in each axis.
    pub x: f32,
    pub y: f32,
    pub stamp: Option<&'a RgbaImage>,
}

/// RGBA samples, one pixel per grid cell.
///
/// Owned and moved as a unit: the worker path hands the buffer to another
/// thread and the caller never reads it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SampleBuffer {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

/// Draw `source` into a `cols x rows` sample buffer.
///
/// Transparent source pixels are flattened over white. `blur` is a Gaussian
/// standard deviation in grid pixels (0 disables it). `font_aspect` is the
/// glyph width / height ratio used to keep the overlay round once the cells
/// are stretched into glyphs.
pub fn rasterize(
    source: &ImageSource,
    cols: u32,
    rows: u32,
    blur: f32,
    overlay: Option<&CursorOverlay<'_>>,
    font_aspect: f32,
) -> SampleBuffer {
    let cols = cols.max(1);
    let rows = rows.max(1);

    let mut buf = imageops::resize(source.as_image(), cols, rows, FilterType::Triangle);
    flatten_over_white(&mut buf);

    if blur.is_finite() && blur > 0.0 {
        buf = imageops::blur(&buf, blur);
    }

    if let Some(overlay) = overlay {
        draw_overlay(&mut buf, overlay, font_aspect);
    }

    SampleBuffer {
        width: cols,
        height: rows,
        rgba: buf.into_raw(),
    }
}

fn flatten_over_white(buf: &mut RgbaImage) {
    for px in buf.pixels_mut() {
        let a = px.0[3] as f32 / 255.0;
        if a >= 1.0 {
            continue;
        }
        for c in &mut px.0[..3] {
            *c = (*c as f32 * a + 255.0 * (1.0 - a)).round() as u8;
        }
        px.0[3] = 255;
    }
}

/// Composite the overlay in a drawing space scaled by `(1, font_aspect)`.
///
/// Buffer pixel `(bx, by)` maps to overlay point `(bx, by / font_aspect)`, and
/// the cursor maps to `(x * w, y * h / font_aspect)`.
fn draw_overlay(buf: &mut RgbaImage, overlay: &CursorOverlay<'_>, font_aspect: f32) {
    let aspect = if font_aspect.is_finite() && font_aspect > 0.0 {
        font_aspect
    } else {
        1.0
    };
    let (w, h) = buf.dimensions();
    let cx = overlay.x.clamp(0.0, 1.0) * w as f32;
    let cy = overlay.y.clamp(0.0, 1.0) * h as f32 / aspect;
    let radius = (overlay.width / 2.0).max(0.0);
    let ink = if overlay.invert { 255u8 } else { 0u8 };

    if overlay.style == CursorStyle::Image {
        if let Some(stamp) = overlay.stamp {
            draw_stamp(buf, stamp, cx, cy, overlay.width, overlay.invert, aspect);
        }
        return;
    }
    if radius <= 0.0 {
        return;
    }

    for (x, y, px) in buf.enumerate_pixels_mut() {
        let u = x as f32 + 0.5;
        let v = (y as f32 + 0.5) / aspect;
        let d = ((u - cx).powi(2) + (v - cy).powi(2)).sqrt();
        let alpha = match overlay.style {
            CursorStyle::Gradient => (1.0 - d / radius).max(0.0),
            CursorStyle::Circle if d <= radius => 1.0,
            _ => 0.0,
        };
        if alpha > 0.0 {
            blend(px, [ink, ink, ink], alpha);
        }
    }
}

fn draw_stamp(
    buf: &mut RgbaImage,
    stamp: &RgbaImage,
    cx: f32,
    cy: f32,
    width: f32,
    invert: bool,
    aspect: f32,
) {
    let (sw, sh) = stamp.dimensions();
    if sw == 0 || sh == 0 || width <= 0.0 {
        return;
    }
    let draw_w = width;
    let draw_h = width * sh as f32 / sw as f32;
    let left = cx - draw_w / 2.0;
    let top = cy - draw_h / 2.0;

    for (x, y, px) in buf.enumerate_pixels_mut() {
        let u = x as f32 + 0.5 - left;
        let v = (y as f32 + 0.5) / aspect - top;
        if u < 0.0 || v < 0.0 || u >= draw_w || v >= draw_h {
            continue;
        }
        let sx = ((u / draw_w * sw as f32) as u32).min(sw - 1);
        let sy = ((v / draw_h * sh as f32) as u32).min(sh - 1);
        let Pixel([r, g, b, a]) = *stamp.get_pixel(sx, sy);
        let rgb = if invert {
            [255 - r, 255 - g, 255 - b]
        } else {
            [r, g, b]
        };
        blend(px, rgb, a as f32 / 255.0);
    }
}

#[inline]
fn blend(px: &mut Pixel<u8>, rgb: [u8; 3], alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    for (dst, src) in px.0[..3].iter_mut().zip(rgb) {
        *dst = (src as f32 * alpha + *dst as f32 * (1.0 - alpha)).round() as u8;
    }
}
