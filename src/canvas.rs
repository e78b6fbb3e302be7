//! Canvas renderer: draws a character grid into an RGBA image.
//!
//! The grid is drawn once at its natural size (`cols * cell_w` by
//! `rows * cell_h`), scaled nearest-neighbour by the layout transform and
//! centred on a canvas the size of the container.

use fontdue::{Font, Metrics};
use image::{Rgba as Pixel, RgbaImage};
use std::collections::HashMap;

use crate::ascii::{CharacterGrid, Palette, Rgba, DEFAULT_FONT_ASPECT_RATIO};
use crate::font::{FontSpec, FontdueMetrics};
use crate::layout::Transform;

struct GlyphBitmap {
    metrics: Metrics,
    coverage: Vec<u8>,
}

/// Grid to image renderer with a per-glyph bitmap cache.
pub struct CanvasRenderer {
    spec: FontSpec,
    font: Option<FontdueMetrics>,
    background: Rgba,
    glyph_cache: HashMap<char, GlyphBitmap>,
}

impl CanvasRenderer {
    /// Without a font, cells are drawn as solid blocks.
    pub fn new(spec: FontSpec, font: Option<FontdueMetrics>) -> Self {
        Self {
            spec,
            font,
            background: Rgba::BLACK,
            glyph_cache: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    /// Pixel size of one cell.
    pub fn cell_size(&self) -> (u32, u32) {
        let cell_h = self.spec.cell_height();
        let cell_w = match &self.font {
            Some(font) => font.cell_width(&self.spec),
            None => cell_h * DEFAULT_FONT_ASPECT_RATIO,
        };
        (cell_w.ceil().max(1.0) as u32, cell_h.ceil().max(1.0) as u32)
    }

    /// Unscaled pixel size of `grid`.
    pub fn natural_size(&self, grid: &CharacterGrid) -> (u32, u32) {
        let (cell_w, cell_h) = self.cell_size();
        (
            grid.width.saturating_mul(cell_w).max(1),
            grid.height.saturating_mul(cell_h).max(1),
        )
    }

    /// Draw `grid` at natural size.
    ///
    /// `palette` is only consulted by the block fallback, where a glyph's
    /// coverage follows its position in the ramp.
    pub fn render_natural(&mut self, grid: &CharacterGrid, palette: &Palette) -> RgbaImage {
        let (width, height) = self.natural_size(grid);
        let mut image = RgbaImage::from_pixel(width, height, to_pixel(self.background));
        let (cell_w, cell_h) = self.cell_size();

        for (row, cells) in grid.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.ch == ' ' {
                    continue;
                }
                let x = col as i32 * cell_w as i32;
                let y = row as i32 * cell_h as i32;
                if self.font.is_some() {
                    self.draw_glyph(&mut image, x, y, cell_h, cell.ch, cell.color);
                } else {
                    let coverage = block_coverage(palette, cell.ch);
                    fill_block(&mut image, x, y, cell_w, cell_h, cell.color, coverage);
                }
            }
        }

        image
    }

    /// Draw `grid`, scale it by `transform` and centre it on a `canvas` sized image.
    pub fn render(
        &mut self,
        grid: &CharacterGrid,
        palette: &Palette,
        canvas: (u32, u32),
        transform: Transform,
    ) -> RgbaImage {
        let natural = self.render_natural(grid, palette);
        let scale = if transform.scale.is_finite() && transform.scale > 0.0 {
            transform.scale
        } else {
            1.0
        };
        let (nw, nh) = natural.dimensions();
        let (cw, ch) = (canvas.0.max(1), canvas.1.max(1));
        let (dx, dy) = Transform { scale }
            .centered_offset((nw as f32, nh as f32), (cw as f32, ch as f32));

        // Nearest-neighbour lookup per canvas pixel; the scaled image is never built.
        let mut out = RgbaImage::from_pixel(cw, ch, to_pixel(self.background));
        for (px, py, pixel) in out.enumerate_pixels_mut() {
            let sx = ((px as f32 + 0.5 - dx) / scale).floor();
            let sy = ((py as f32 + 0.5 - dy) / scale).floor();
            if sx < 0.0 || sy < 0.0 || sx >= nw as f32 || sy >= nh as f32 {
                continue;
            }
            *pixel = *natural.get_pixel(sx as u32, sy as u32);
        }

        log::debug!(
            "Canvas {}x{} (grid {}x{}, scale {:.3})",
            cw,
            ch,
            grid.width,
            grid.height,
            scale
        );
        out
    }

    fn draw_glyph(
        &mut self,
        image: &mut RgbaImage,
        x: i32,
        y: i32,
        cell_h: u32,
        ch: char,
        color: Rgba,
    ) {
        let Some(font) = self.font.as_ref().map(FontdueMetrics::font) else {
            return;
        };
        let size = self.spec.size;
        let (ascent, descent) = font
            .horizontal_line_metrics(size)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((size * 0.8, -size * 0.2));
        let leading = (cell_h as f32 - (ascent - descent)) / 2.0;
        let baseline = y + (leading + ascent).round() as i32;

        let glyph = self
            .glyph_cache
            .entry(ch)
            .or_insert_with(|| rasterize_glyph(font, ch, size));
        let m = glyph.metrics;
        if m.width == 0 || m.height == 0 {
            return;
        }

        let left = x + m.xmin;
        let top = baseline - m.height as i32 - m.ymin;
        for gy in 0..m.height {
            for gx in 0..m.width {
                let value = glyph.coverage[gy * m.width + gx];
                if value == 0 {
                    continue;
                }
                blend_pixel(image, left + gx as i32, top + gy as i32, color, value as f32 / 255.0);
            }
        }
    }
}

fn rasterize_glyph(font: &Font, ch: char, size: f32) -> GlyphBitmap {
    let (metrics, coverage) = font.rasterize(ch, size);
    GlyphBitmap { metrics, coverage }
}

/// Ink coverage for the block fallback: the darkest glyph fills its cell.
fn block_coverage(palette: &Palette, ch: char) -> f32 {
    let n = palette.len();
    match palette.index_of(ch) {
        Some(i) if n > 1 => 1.0 - i as f32 / (n - 1) as f32,
        _ => 1.0,
    }
}

fn fill_block(image: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, color: Rgba, coverage: f32) {
    if coverage <= 0.0 {
        return;
    }
    for py in y..y + h as i32 {
        for px in x..x + w as i32 {
            blend_pixel(image, px, py, color, coverage);
        }
    }
}

fn blend_pixel(image: &mut RgbaImage, x: i32, y: i32, color: Rgba, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= image.width() || y as u32 >= image.height() {
        return;
    }
    let a = (coverage * color.a as f32 / 255.0).clamp(0.0, 1.0);
    let dst = image.get_pixel_mut(x as u32, y as u32);
    let mix = |f: u8, b: u8| (f as f32 * a + b as f32 * (1.0 - a)).round() as u8;
    dst.0 = [
        mix(color.r, dst.0[0]),
        mix(color.g, dst.0[1]),
        mix(color.b, dst.0[2]),
        (dst.0[3] as f32 + (255.0 - dst.0[3] as f32) * a).round() as u8,
    ];
}

fn to_pixel(c: Rgba) -> Pixel<u8> {
    Pixel([c.r, c.g, c.b, c.a])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::STANDARD_CHARSET;

    fn renderer() -> CanvasRenderer {
        CanvasRenderer::new(FontSpec::default(), None)
    }

    fn grid() -> CharacterGrid {
        CharacterGrid::from_chars(vec!['@', ' '], Rgba::WHITE, 2, 1)
    }

    #[test]
    fn test_cell_size_without_font() {
        // 12px rows at the default 0.55 aspect
        assert_eq!(renderer().cell_size(), (7, 12));
        assert_eq!(renderer().natural_size(&grid()), (14, 12));
    }

    #[test]
    fn test_block_fallback_natural() {
        let palette = Palette::new(STANDARD_CHARSET);
        let img = renderer().render_natural(&grid(), &palette);
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(8, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_block_coverage_follows_ramp() {
        let palette = Palette::new(STANDARD_CHARSET);
        assert_eq!(block_coverage(&palette, '@'), 1.0);
        assert_eq!(block_coverage(&palette, '.'), 0.0);
        let mid = block_coverage(&palette, '+');
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_render_centres_at_natural_scale() {
        let palette = Palette::new(STANDARD_CHARSET);
        let img = renderer().render(&grid(), &palette, (28, 24), Transform::IDENTITY);
        assert_eq!(img.dimensions(), (28, 24));
        // content occupies (7..21, 6..18)
        assert_eq!(img.get_pixel(8, 7).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(2, 2).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(16, 7).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_render_scales_nearest() {
        let palette = Palette::new(STANDARD_CHARSET);
        let img = renderer().render(&grid(), &palette, (28, 24), Transform { scale: 2.0 });
        assert_eq!(img.get_pixel(2, 20).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(12, 2).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(17, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_huge_scale_stays_canvas_sized() {
        let palette = Palette::new(STANDARD_CHARSET);
        let g = CharacterGrid::from_chars(vec!['@', '@'], Rgba::WHITE, 2, 1);
        let img = renderer().render(&g, &palette, (16, 16), Transform { scale: 1.0e6 });
        assert_eq!(img.dimensions(), (16, 16));
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_translucent_colour_blends() {
        let palette = Palette::new(STANDARD_CHARSET);
        let half = Rgba { a: 128, ..Rgba::WHITE };
        let g = CharacterGrid::from_chars(vec!['@'], half, 1, 1);
        let img = renderer().render_natural(&g, &palette);
        assert_eq!(img.get_pixel(0, 0).0[0], 128);
    }
}
