//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, RenderArgs};
pub use commands::{animate, list_palettes, render};
pub use enums::{Coloring, Cursor, Dither, Format, Sizing};
