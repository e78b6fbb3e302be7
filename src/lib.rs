//! glyphgrid library crate.
//!
//! Converts raster images into grids of glyphs: resize and blur, optional
//! cursor overlay, luminance normalization, dithered quantization onto a
//! glyph palette, and per-glyph colour. Grids render as plain text, ANSI,
//! HTML, JSON or an RGBA canvas.
//!
//! ```no_run
//! use glyphgrid::pipeline::{Pipeline, RenderConfig};
//! use glyphgrid::source::ImageSource;
//!
//! let source = ImageSource::load("photo.png")?;
//! let grid = Pipeline::new(RenderConfig::default()).run(&source, None, 0);
//! println!("{}", grid.to_string_display());
//! # Ok::<(), glyphgrid::Error>(())
//! ```

pub mod ascii;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod font;
pub mod interaction;
pub mod layout;
pub mod pipeline;
pub mod raster;
pub mod renderer;
pub mod source;
pub mod worker;

pub use error::{Error, Result};
