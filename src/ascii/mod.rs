//! Luminance-to-glyph conversion.
//!
//! The stages a sampled image goes through on its way to a character grid:
//!
//! 1. **Luminance** - RGB to BT.601 luminance, then inversion, contrast and
//!    brightness ([`normalize`])
//! 2. **Palette** - resolve the glyph ramp ([`resolve_palette`])
//! 3. **Quantize** - map luminance to palette indices, optionally dithered
//!    ([`quantize`])
//! 4. **Colour** - per-glyph colour from the solid/gradient/glow settings
//!
//! # Character Sets
//!
//! Built-in palettes via [`CharSet`]:
//! - `detailed` - 70-glyph ramp
//! - `standard` - 9 levels
//! - `blocks` - Unicode shade blocks
//! - `binary` - `01`
//! - `hex` - `0-9A-F`

mod charset;
mod color;
mod dimensions;
pub mod dither;
mod grayscale;
mod grid;
mod rng;

pub use charset::{
    resolve_palette, CharSet, Palette, BINARY_CHARSET, BLOCKS_CHARSET, CUSTOM, DETAILED_CHARSET,
    FALLBACK_CHARSET, HEX_CHARSET, STANDARD_CHARSET,
};
pub use color::{ColorConfig, ColorMode, Rgba};
pub use dimensions::{grid_dimensions, DEFAULT_FONT_ASPECT_RATIO};
pub use dither::{quantize, DitherAlgorithm, WhiteMode, BAYER_4X4};
pub use grayscale::{luminance, normalize, LuminanceBuffer, Photometric, MAX_CONTRAST};
pub use grid::{Cell, CharacterGrid};
pub use rng::{random_seed, SeededRng};
