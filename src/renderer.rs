//! Text renderers for character grids.
//!
//! All renderers build the complete output in a `String` so the caller can
//! write it in one go.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::ascii::{CharacterGrid, Rgba};
use crate::font::FontSpec;
use crate::layout::Transform;

/// Output flavour for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// Glyphs only
    #[default]
    Plain,
    /// 24-bit ANSI foreground colours
    Ansi,
    /// `<pre>` with coloured spans and the layout transform
    Html,
    /// Serialized grid
    Json,
}

/// Glyphs only, one line per row.
pub fn render_plain(grid: &CharacterGrid) -> String {
    grid.to_string_display()
}

/// Glyphs with true-colour escapes.
///
/// A colour escape is emitted only when the colour changes along a row.
/// Translucent colours (glow mode) are composited over `background`.
pub fn render_ansi(grid: &CharacterGrid, background: Rgba) -> String {
    let mut output = String::with_capacity(grid.cells.len() * 4);
    for (i, row) in grid.rows().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        let mut current: Option<Rgba> = None;
        for cell in row {
            let color = cell.color.over(background);
            if current != Some(color) {
                let _ = write!(output, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b);
                current = Some(color);
            }
            output.push(cell.ch);
        }
        output.push_str("\x1b[0m");
    }
    output
}

/// A self-contained HTML fragment.
///
/// The `<pre>` is absolutely centred in its container and scaled with
/// `transform`; runs of equal colour share one `<span>`.
pub fn render_html(grid: &CharacterGrid, transform: Transform, font: &FontSpec) -> String {
    let mut output = String::new();
    output.push_str("<div class=\"glyphgrid\" style=\"position:relative;overflow:hidden\">");
    let _ = write!(
        output,
        "<pre style=\"position:absolute;left:50%;top:50%;margin:0;transform:{};\
         font-size:{}px;line-height:{};letter-spacing:{}px\">",
        transform.to_css(),
        font.size,
        font.line_height,
        font.letter_spacing
    );

    for (i, row) in grid.rows().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        let mut run = String::new();
        let mut run_color: Option<Rgba> = None;
        for cell in row {
            if run_color != Some(cell.color) {
                if let Some(color) = run_color {
                    push_span(&mut output, color, &run);
                    run.clear();
                }
                run_color = Some(cell.color);
            }
            push_escaped(&mut run, cell.ch);
        }
        if let Some(color) = run_color {
            push_span(&mut output, color, &run);
        }
    }

    output.push_str("</pre></div>\n");
    output
}

/// Grid as JSON (`width`, `height`, `cells`).
pub fn render_json(grid: &CharacterGrid) -> serde_json::Result<String> {
    serde_json::to_string(grid)
}

fn push_span(output: &mut String, color: Rgba, text: &str) {
    let _ = write!(
        output,
        "<span style=\"color:{}\">{}</span>",
        color.to_css(),
        text
    );
}

fn push_escaped(output: &mut String, ch: char) {
    match ch {
        '&' => output.push_str("&amp;"),
        '<' => output.push_str("&lt;"),
        '>' => output.push_str("&gt;"),
        '"' => output.push_str("&quot;"),
        '\'' => output.push_str("&#39;"),
        _ => output.push(ch),
    }
}
