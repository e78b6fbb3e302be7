//! The image to character-grid pipeline.
//!
//! Two halves, so the heavy per-cell work can run elsewhere:
//!
//! - [`Pipeline::sample`] resizes, blurs and stamps the cursor overlay,
//!   producing a [`SampleBuffer`]. Needs the decoded image.
//! - [`transform`] normalizes, resolves the palette and quantizes. Needs only
//!   the samples, a [`TransformParams`] and a seed; it keeps no state.
//!
//! [`Pipeline::run`] does both on the calling thread.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ascii::{
    grid_dimensions, normalize, quantize, resolve_palette, Cell, CharacterGrid, ColorConfig,
    DitherAlgorithm, Photometric, SeededRng, WhiteMode, DEFAULT_FONT_ASPECT_RATIO,
};
use crate::raster::{rasterize, CursorConfig, CursorOverlay, SampleBuffer};
use crate::source::ImageSource;

/// Settings for one render. Immutable per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    /// Target character columns.
    pub output_width: u32,
    /// Glyph width / glyph height.
    pub font_aspect_ratio: f32,
    pub dither: DitherAlgorithm,
    /// Palette name, or `"custom"`.
    pub character_set: String,
    /// Literal glyph ramp, used when `character_set` is `"custom"`.
    pub custom_character_set: String,
    pub white_mode: WhiteMode,
    pub invert_colors: bool,
    /// Gaussian blur in grid pixels.
    pub blur: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub cursor: Option<CursorConfig>,
    pub color: ColorConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_width: 100,
            font_aspect_ratio: DEFAULT_FONT_ASPECT_RATIO,
            dither: DitherAlgorithm::None,
            character_set: "detailed".to_string(),
            custom_character_set: String::new(),
            white_mode: WhiteMode::Keep,
            invert_colors: false,
            blur: 0.0,
            brightness: 0.0,
            contrast: 0.0,
            cursor: None,
            color: ColorConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn photometric(&self) -> Photometric {
        Photometric {
            invert: self.invert_colors,
            brightness: self.brightness,
            contrast: self.contrast,
        }
    }
}

/// Everything [`transform`] needs besides the samples and the seed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    pub dither: DitherAlgorithm,
    pub character_set: String,
    pub custom_character_set: String,
    pub white_mode: WhiteMode,
    pub photometric: Photometric,
    pub color: ColorConfig,
    /// Named palettes that take precedence over the built-ins.
    pub palettes: HashMap<String, String>,
}

impl TransformParams {
    pub fn new(config: &RenderConfig, palettes: &HashMap<String, String>) -> Self {
        Self {
            dither: config.dither,
            character_set: config.character_set.clone(),
            custom_character_set: config.custom_character_set.clone(),
            white_mode: config.white_mode,
            photometric: config.photometric(),
            color: config.color,
            palettes: palettes.clone(),
        }
    }
}

/// Normalize, quantize and colour a sample buffer.
pub fn transform(samples: SampleBuffer, params: &TransformParams, seed: u32) -> CharacterGrid {
    let SampleBuffer {
        width,
        height,
        rgba,
    } = samples;

    let mut lum = normalize(&rgba, width, height, &params.photometric);
    let external = (!params.palettes.is_empty()).then_some(&params.palettes);
    let palette = resolve_palette(
        &params.character_set,
        &params.custom_character_set,
        external,
    );
    let mut rng = SeededRng::new(seed);
    let indices = quantize(
        &mut lum,
        palette.len(),
        params.dither,
        params.white_mode,
        &mut rng,
    );

    let cells = indices
        .iter()
        .zip(&lum.original)
        .map(|(index, &l)| Cell {
            ch: index.map_or(' ', |i| palette.glyph(i)),
            color: params.color.resolve(l),
        })
        .collect();

    log::debug!(
        "Rendered {}x{} grid ({} levels, {} dither, seed {})",
        width,
        height,
        palette.len(),
        params.dither.name(),
        seed
    );

    CharacterGrid {
        width,
        height,
        cells,
    }
}

/// Owns the render settings and the optional cursor stamp image.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: RenderConfig,
    palettes: HashMap<String, String>,
    stamp: Option<RgbaImage>,
}

impl Pipeline {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            palettes: HashMap::new(),
            stamp: None,
        }
    }

    /// Named palettes consulted before the built-ins.
    pub fn with_palettes(mut self, palettes: HashMap<String, String>) -> Self {
        self.palettes = palettes;
        self
    }

    /// Image stamped at the cursor for the `image` cursor style.
    pub fn with_cursor_stamp(mut self, stamp: RgbaImage) -> Self {
        self.stamp = Some(stamp);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the settings, keeping palettes and stamp.
    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// Grid size for `source` under the current settings.
    pub fn dimensions(&self, source: &ImageSource) -> (u32, u32) {
        grid_dimensions(
            source.width(),
            source.height(),
            self.config.output_width,
            self.config.font_aspect_ratio,
        )
    }

    /// Rasterize `source` to one sample per cell.
    ///
    /// `cursor` is the fractional pointer position, or `None` until the
    /// pointer has produced its first event. It is ignored when no cursor
    /// style is configured.
    pub fn sample(&self, source: &ImageSource, cursor: Option<(f32, f32)>) -> SampleBuffer {
        let (cols, rows) = self.dimensions(source);
        let overlay = match (&self.config.cursor, cursor) {
            (Some(cfg), Some((x, y))) => Some(CursorOverlay {
                style: cfg.style,
                width: cfg.width,
                invert: cfg.invert,
                x,
                y,
                stamp: self.stamp.as_ref(),
            }),
            _ => None,
        };
        rasterize(
            source,
            cols,
            rows,
            self.config.blur,
            overlay.as_ref(),
            self.config.font_aspect_ratio,
        )
    }

    pub fn transform_params(&self) -> TransformParams {
        TransformParams::new(&self.config, &self.palettes)
    }

    /// Run the whole pipeline on the calling thread.
    pub fn run(&self, source: &ImageSource, cursor: Option<(f32, f32)>, seed: u32) -> CharacterGrid {
        let samples = self.sample(source, cursor);
        transform(samples, &self.transform_params(), seed)
    }
}
