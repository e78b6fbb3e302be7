//! CLI enum types for dithering, colour, cursor and output options.

use clap::ValueEnum;

use crate::ascii::{ColorMode, DitherAlgorithm};
use crate::layout::SizingMode;
use crate::raster::CursorStyle;
use crate::renderer::TextFormat;

/// Dithering algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Dither {
    #[default]
    None,
    Floyd,
    Atkinson,
    Noise,
    Ordered,
}

impl From<Dither> for DitherAlgorithm {
    fn from(d: Dither) -> Self {
        match d {
            Dither::None => DitherAlgorithm::None,
            Dither::Floyd => DitherAlgorithm::Floyd,
            Dither::Atkinson => DitherAlgorithm::Atkinson,
            Dither::Noise => DitherAlgorithm::Noise,
            Dither::Ordered => DitherAlgorithm::Ordered,
        }
    }
}

/// Glyph colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Coloring {
    Solid,
    Gradient,
    Glow,
}

impl From<Coloring> for ColorMode {
    fn from(c: Coloring) -> Self {
        match c {
            Coloring::Solid => ColorMode::Solid,
            Coloring::Gradient => ColorMode::Gradient,
            Coloring::Glow => ColorMode::Glow,
        }
    }
}

/// Cursor overlay shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Cursor {
    Gradient,
    Circle,
    Image,
}

impl From<Cursor> for CursorStyle {
    fn from(c: Cursor) -> Self {
        match c {
            Cursor::Gradient => CursorStyle::Gradient,
            Cursor::Circle => CursorStyle::Circle,
            Cursor::Image => CursorStyle::Image,
        }
    }
}

/// Text output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Plain,
    Ansi,
    Html,
    Json,
}

impl From<Format> for TextFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Plain => TextFormat::Plain,
            Format::Ansi => TextFormat::Ansi,
            Format::Html => TextFormat::Html,
            Format::Json => TextFormat::Json,
        }
    }
}

/// Scaling when both container dimensions are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sizing {
    Fit,
    Fill,
}

impl From<Sizing> for SizingMode {
    fn from(s: Sizing) -> Self {
        match s {
            Sizing::Fit => SizingMode::Fit,
            Sizing::Fill => SizingMode::Fill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dither_to_algorithm() {
        assert_eq!(DitherAlgorithm::from(Dither::None), DitherAlgorithm::None);
        assert_eq!(DitherAlgorithm::from(Dither::Floyd), DitherAlgorithm::Floyd);
        assert_eq!(
            DitherAlgorithm::from(Dither::Atkinson),
            DitherAlgorithm::Atkinson
        );
        assert_eq!(DitherAlgorithm::from(Dither::Noise), DitherAlgorithm::Noise);
        assert_eq!(
            DitherAlgorithm::from(Dither::Ordered),
            DitherAlgorithm::Ordered
        );
    }

    #[test]
    fn test_format_to_text_format() {
        assert_eq!(TextFormat::from(Format::Ansi), TextFormat::Ansi);
        assert_eq!(TextFormat::from(Format::Html), TextFormat::Html);
    }

    #[test]
    fn test_cursor_and_sizing() {
        assert_eq!(CursorStyle::from(Cursor::Circle), CursorStyle::Circle);
        assert_eq!(SizingMode::from(Sizing::Fill), SizingMode::Fill);
        assert_eq!(ColorMode::from(Coloring::Glow), ColorMode::Glow);
    }
}
