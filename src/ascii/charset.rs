//! Character palettes and palette resolution.

use std::collections::HashMap;

/// 70-glyph density ramp, densest first.
pub const DETAILED_CHARSET: &str =
    "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// Classic 9-level ramp.
pub const STANDARD_CHARSET: &str = "@%#*+=-:.";

/// Unicode shade blocks (5 levels), full block first.
pub const BLOCKS_CHARSET: &str = "█▓▒░ ";

/// Two glyphs: `0` for dark cells, `1` for light ones.
pub const BINARY_CHARSET: &str = "01";

/// Hex digits (16 levels).
pub const HEX_CHARSET: &str = "0123456789ABCDEF";

/// Used when a palette resolves to an empty string: one dark glyph, one light.
pub const FALLBACK_CHARSET: &str = "@ ";

/// Name that selects the caller's literal character string.
pub const CUSTOM: &str = "custom";

/// Built-in named palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    /// 70-glyph ramp
    #[default]
    Detailed,
    /// 9-level ramp
    Standard,
    /// Unicode shade blocks
    Blocks,
    /// `01`
    Binary,
    /// `0-9A-F`
    Hex,
}

impl CharSet {
    pub const ALL: [CharSet; 5] = [
        CharSet::Detailed,
        CharSet::Standard,
        CharSet::Blocks,
        CharSet::Binary,
        CharSet::Hex,
    ];

    /// The palette string for this charset.
    pub fn chars(&self) -> &'static str {
        match self {
            CharSet::Detailed => DETAILED_CHARSET,
            CharSet::Standard => STANDARD_CHARSET,
            CharSet::Blocks => BLOCKS_CHARSET,
            CharSet::Binary => BINARY_CHARSET,
            CharSet::Hex => HEX_CHARSET,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharSet::Detailed => "detailed",
            CharSet::Standard => "standard",
            CharSet::Blocks => "blocks",
            CharSet::Binary => "binary",
            CharSet::Hex => "hex",
        }
    }

    /// Look up a built-in charset by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

/// Ordered, non-empty glyph ramp. Index 0 is used for the darkest cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    glyphs: Vec<char>,
}

impl Palette {
    /// Build a palette from a string, substituting [`FALLBACK_CHARSET`] when
    /// the string is empty.
    pub fn new(chars: &str) -> Self {
        let glyphs: Vec<char> = chars.chars().collect();
        if glyphs.is_empty() {
            return Self {
                glyphs: FALLBACK_CHARSET.chars().collect(),
            };
        }
        Self { glyphs }
    }

    /// Number of levels. Always at least 1.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Palettes are never empty; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Glyph at `index`, clamped to the last level.
    pub fn glyph(&self, index: usize) -> char {
        self.glyphs[index.min(self.glyphs.len() - 1)]
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Names of the built-in palettes, in listing order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        CharSet::ALL.into_iter().map(|set| set.name())
    }

    /// Position of a glyph in the ramp, if present.
    pub fn index_of(&self, ch: char) -> Option<usize> {
        self.glyphs.iter().position(|&g| g == ch)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DETAILED_CHARSET)
    }
}

/// Resolve the active palette.
///
/// Resolution order:
/// 1. `"custom"` uses `custom` verbatim, or a single space when it is empty.
/// 2. Otherwise the external mapping (when it has a non-empty entry), then
///    the built-in named palettes, then the `detailed` ramp.
/// 3. An empty result is replaced by [`FALLBACK_CHARSET`].
///
/// The returned palette always has at least one glyph.
pub fn resolve_palette(
    character_set: &str,
    custom: &str,
    external: Option<&HashMap<String, String>>,
) -> Palette {
    if character_set.trim().eq_ignore_ascii_case(CUSTOM) {
        if custom.is_empty() {
            return Palette::new(" ");
        }
        return Palette::new(custom);
    }

    if let Some(chars) = external.and_then(|m| lookup_external(m, character_set)) {
        return Palette::new(chars);
    }

    match CharSet::from_name(character_set) {
        Some(set) => Palette::new(set.chars()),
        None => {
            log::warn!(
                "Unknown character set '{}', falling back to '{}'",
                character_set,
                CharSet::Detailed.name()
            );
            Palette::new(DETAILED_CHARSET)
        }
    }
}

fn lookup_external<'a>(map: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    map.get(name)
        .or_else(|| {
            map.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name.trim()))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
        .filter(|s| !s.is_empty())
}
