//! Character grid produced by one pipeline run.

use serde::Serialize;

use super::color::Rgba;

/// One output cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub ch: char,
    pub color: Rgba,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: Rgba::WHITE,
        }
    }
}

/// Row-major grid of glyphs and colours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterGrid {
    /// Width in characters
    pub width: u32,
    /// Height in characters
    pub height: u32,
    pub cells: Vec<Cell>,
}

impl Default for CharacterGrid {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl CharacterGrid {
    /// Blank grid of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// Grid from a character vector; every glyph gets `color`.
    pub fn from_chars(chars: Vec<char>, color: Rgba, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: chars.into_iter().map(|ch| Cell { ch, color }).collect(),
        }
    }

    pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Glyphs only, rows joined by newlines.
    pub fn to_string_display(&self) -> String {
        if self.width == 0 || self.height == 0 {
            return String::new();
        }

        self.rows()
            .map(|row| row.iter().map(|c| c.ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_new() {
        let grid = CharacterGrid::new(20, 10);
        assert_eq!(grid.cells.len(), 200);
        assert!(grid.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn test_grid_default_is_empty() {
        let grid = CharacterGrid::default();
        assert!(grid.cells.is_empty());
        assert_eq!(grid.to_string_display(), "");
    }

    #[test]
    fn test_to_string_display() {
        let grid = CharacterGrid::from_chars(vec!['#', '.', ':', '@', '*', '+'], Rgba::WHITE, 3, 2);
        assert_eq!(grid.to_string_display(), "#.:\n@*+");
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let grid = CharacterGrid::new(2, 2);
        assert!(grid.cell(2, 0).is_none());
        assert!(grid.cell(1, 1).is_some());
    }
}
