//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{Coloring, Cursor, Dither, Format, Sizing};
use crate::ascii::{Rgba, WhiteMode};
use crate::config::Config;
use crate::raster::CursorConfig;

/// Render images as dithered, coloured character art
#[derive(Parser, Debug)]
#[command(name = "glyphgrid")]
#[command(version, about = "Image to character-grid renderer", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render an image once
    Render {
        /// Image to render
        image: PathBuf,

        #[command(flatten)]
        render: RenderArgs,

        /// Text output format
        #[arg(long, short, value_enum, default_value = "plain")]
        format: Format,

        /// Also draw the grid to a PNG
        #[arg(long)]
        png: Option<PathBuf>,

        /// RNG seed for noise dithering (random if omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// Cursor position as fractions, e.g. 0.5,0.5
        #[arg(long, value_parser = parse_point)]
        cursor: Option<(f32, f32)>,

        /// Run the transform on the worker thread
        #[arg(long)]
        worker: bool,
    },
    /// Animate an image in the terminal until Ctrl-C
    Animate {
        /// Image to render
        image: PathBuf,

        #[command(flatten)]
        render: RenderArgs,

        /// Re-seed noise every N milliseconds (minimum 50)
        #[arg(long)]
        static_ms: Option<u64>,

        /// Stop after N frames
        #[arg(long)]
        frames: Option<u64>,

        /// Initial RNG seed
        #[arg(long)]
        seed: Option<u32>,
    },
    /// List available palettes
    Palettes,
}

/// Rendering flags shared by `render` and `animate`. Unset flags keep the
/// config file value.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Output width in characters
    #[arg(long, short = 'w', value_parser = parse_width)]
    pub width: Option<u32>,

    /// Glyph width / glyph height
    #[arg(long, value_parser = parse_positive)]
    pub aspect: Option<f32>,

    /// Dithering algorithm
    #[arg(long, short, value_enum)]
    pub dither: Option<Dither>,

    /// Palette name (detailed, standard, blocks, binary, hex, custom or a
    /// config palette)
    #[arg(long)]
    pub charset: Option<String>,

    /// Glyph ramp for --charset custom, darkest first
    #[arg(long)]
    pub custom_charset: Option<String>,

    /// Render pure white as blank
    #[arg(long)]
    pub ignore_white: bool,

    /// Invert luminance
    #[arg(long)]
    pub invert: bool,

    /// Blur radius in grid pixels
    #[arg(long, value_parser = parse_non_negative)]
    pub blur: Option<f32>,

    /// Brightness offset
    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<f32>,

    /// Contrast (-255..255)
    #[arg(long, allow_hyphen_values = true)]
    pub contrast: Option<f32>,

    /// Glyph colouring
    #[arg(long, value_enum)]
    pub color_mode: Option<Coloring>,

    /// First colour (#rgb, #rrggbb, #rrggbbaa)
    #[arg(long, value_parser = parse_color)]
    pub color1: Option<Rgba>,

    /// Second colour
    #[arg(long, value_parser = parse_color)]
    pub color2: Option<Rgba>,

    /// Gradient start, percent of luminance
    #[arg(long, value_parser = parse_percent)]
    pub point1: Option<f32>,

    /// Gradient end, percent of luminance
    #[arg(long, value_parser = parse_percent)]
    pub point2: Option<f32>,

    /// Glow cutoff, percent of luminance
    #[arg(long, value_parser = parse_percent)]
    pub threshold: Option<f32>,

    /// Cursor overlay style (enables the cursor)
    #[arg(long, value_enum)]
    pub cursor_style: Option<Cursor>,

    /// Cursor diameter in characters
    #[arg(long, value_parser = parse_non_negative)]
    pub cursor_width: Option<f32>,

    /// Draw the cursor in white
    #[arg(long)]
    pub cursor_invert: bool,

    /// Cursor smoothing 0-100
    #[arg(long, value_parser = parse_percent)]
    pub smoothing: Option<f32>,

    /// Stamp image for --cursor-style image
    #[arg(long)]
    pub cursor_image: Option<PathBuf>,

    /// TTF/OTF font for metrics and PNG output
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Font size in pixels
    #[arg(long, value_parser = parse_positive)]
    pub font_size: Option<f32>,

    /// Container width in pixels
    #[arg(long, value_parser = parse_positive)]
    pub container_width: Option<f32>,

    /// Container height in pixels
    #[arg(long, value_parser = parse_positive)]
    pub container_height: Option<f32>,

    /// Scaling when both container dimensions are set
    #[arg(long, value_enum)]
    pub sizing: Option<Sizing>,
}

impl RenderArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        let render = &mut config.render;
        if let Some(w) = self.width {
            render.output_width = w;
        }
        if let Some(a) = self.aspect {
            render.font_aspect_ratio = a;
        }
        if let Some(d) = self.dither {
            render.dither = d.into();
        }
        if let Some(ref c) = self.charset {
            render.character_set = c.clone();
        }
        if let Some(ref c) = self.custom_charset {
            render.custom_character_set = c.clone();
        }
        if self.ignore_white {
            render.white_mode = WhiteMode::Ignore;
        }
        if self.invert {
            render.invert_colors = true;
        }
        if let Some(b) = self.blur {
            render.blur = b;
        }
        if let Some(b) = self.brightness {
            render.brightness = b;
        }
        if let Some(c) = self.contrast {
            render.contrast = c;
        }

        let color = &mut render.color;
        if let Some(m) = self.color_mode {
            color.mode = m.into();
        }
        if let Some(c) = self.color1 {
            color.color1 = c;
        }
        if let Some(c) = self.color2 {
            color.color2 = c;
        }
        if let Some(p) = self.point1 {
            color.point1 = p;
        }
        if let Some(p) = self.point2 {
            color.point2 = p;
        }
        if let Some(t) = self.threshold {
            color.threshold = t;
        }

        let touches_cursor = self.cursor_style.is_some()
            || self.cursor_width.is_some()
            || self.cursor_invert
            || self.smoothing.is_some()
            || self.cursor_image.is_some();
        if touches_cursor {
            let cursor = render.cursor.get_or_insert_with(CursorConfig::default);
            if let Some(s) = self.cursor_style {
                cursor.style = s.into();
            }
            if let Some(w) = self.cursor_width {
                cursor.width = w;
            }
            if self.cursor_invert {
                cursor.invert = true;
            }
            if let Some(s) = self.smoothing {
                cursor.smoothing = s;
            }
            if let Some(ref p) = self.cursor_image {
                cursor.image = Some(p.clone());
            }
        }

        if let Some(ref p) = self.font {
            config.font.path = Some(p.clone());
        }
        if let Some(s) = self.font_size {
            config.font.size = s;
        }
        if let Some(w) = self.container_width {
            config.layout.width = Some(w);
        }
        if let Some(h) = self.container_height {
            config.layout.height = Some(h);
        }
        if let Some(s) = self.sizing {
            config.layout.mode = s.into();
        }
    }
}

fn parse_f32(s: &str) -> Result<f32, String> {
    let v: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !v.is_finite() {
        return Err(format!("'{}' is not a finite number", s));
    }
    Ok(v)
}

/// Parse and validate output width (1-2000 characters)
fn parse_width(s: &str) -> Result<u32, String> {
    let w: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid width", s))?;
    if !(1..=2000).contains(&w) {
        return Err(format!("Width must be between 1 and 2000, got {}", w));
    }
    Ok(w)
}

fn parse_positive(s: &str) -> Result<f32, String> {
    let v = parse_f32(s)?;
    if v <= 0.0 {
        return Err(format!("Value must be greater than 0, got {}", v));
    }
    Ok(v)
}

fn parse_non_negative(s: &str) -> Result<f32, String> {
    let v = parse_f32(s)?;
    if v < 0.0 {
        return Err(format!("Value must not be negative, got {}", v));
    }
    Ok(v)
}

/// Parse and validate a percentage (0-100)
fn parse_percent(s: &str) -> Result<f32, String> {
    let v = parse_f32(s)?;
    if !(0.0..=100.0).contains(&v) {
        return Err(format!("Percentage must be between 0 and 100, got {}", v));
    }
    Ok(v)
}

fn parse_color(s: &str) -> Result<Rgba, String> {
    s.parse::<Rgba>().map_err(|e| e.to_string())
}

/// Parse a fractional point (X,Y format)
fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid point '{}'. Use X,Y (e.g., 0.5,0.5)", s))?;
    Ok((parse_f32(x)?, parse_f32(y)?))
}
