//! Grid size calculation for aspect-ratio-correct rendering.

/// Glyph width divided by glyph height for a typical monospace font.
///
/// Used when no font metrics are available.
pub const DEFAULT_FONT_ASPECT_RATIO: f32 = 0.55;

/// Calculate the character grid size for an image.
///
/// The column count is the requested `output_width`; the row count follows
/// the image's aspect ratio, scaled by the glyph aspect ratio so that
/// non-square character cells still reproduce the image's proportions:
///
/// `rows = round(img_height / img_width * output_width * font_aspect)`
///
/// Degenerate inputs (zero-sized images, zero width, non-finite aspect) are
/// clamped so both results are at least 1.
///
/// # Example
/// ```
/// use glyphgrid::ascii::grid_dimensions;
/// // Square image, 100 columns, glyphs half as wide as tall.
/// assert_eq!(grid_dimensions(400, 400, 100, 0.5), (100, 50));
/// ```
pub fn grid_dimensions(
    img_width: u32,
    img_height: u32,
    output_width: u32,
    font_aspect: f32,
) -> (u32, u32) {
    let cols = output_width.max(1);
    let img_w = img_width.max(1) as f32;
    let img_h = img_height.max(1) as f32;
    let aspect = if font_aspect.is_finite() && font_aspect > 0.0 {
        font_aspect
    } else {
        DEFAULT_FONT_ASPECT_RATIO
    };

    let rows = (img_h / img_w * cols as f32 * aspect).round();
    let rows = if rows.is_finite() { rows.max(1.0) as u32 } else { 1 };
    (cols, rows)
}
