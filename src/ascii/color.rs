//! Glyph colour resolution: solid, gradient and glow modes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same colour with alpha set to zero.
    pub const fn transparent(self) -> Self {
        Self { a: 0, ..self }
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Composite over an opaque background.
    pub fn over(self, bg: Rgba) -> Rgba {
        let a = self.a as f32 / 255.0;
        let mix = |f: u8, b: u8| (f as f32 * a + b as f32 * (1.0 - a)).round() as u8;
        Rgba::opaque(mix(self.r, bg.r), mix(self.g, bg.g), mix(self.b, bg.b))
    }

    /// CSS `rgba(...)` notation.
    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            trim_float(self.a as f32 / 255.0)
        )
    }
}

fn trim_float(v: f32) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

impl FromStr for Rgba {
    type Err = Error;

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || Error::InvalidColor(s.to_string());
        let byte = |i: usize| {
            u8::from_str_radix(hex.get(i..i + 2).ok_or_else(bad)?, 16).map_err(|_| bad())
        };
        match hex.len() {
            3 => {
                let nib = |i: usize| {
                    u8::from_str_radix(hex.get(i..i + 1).ok_or_else(bad)?, 16)
                        .map(|v| v * 17)
                        .map_err(|_| bad())
                };
                Ok(Rgba::opaque(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Ok(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Rgba {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(bad()),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How glyph colours are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Every glyph uses `color1`
    #[default]
    Solid,
    /// `color1` to `color2` between `point1` and `point2`
    Gradient,
    /// `color2` below `threshold`, fully transparent `color2` at or above it.
    ///
    /// A hard step with no partial alpha, like a gradient whose two points meet.
    Glow,
}

/// Colour settings. Points and threshold are percentages of the luminance axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ColorConfig {
    pub mode: ColorMode,
    pub color1: Rgba,
    pub color2: Rgba,
    pub point1: f32,
    pub point2: f32,
    pub threshold: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            mode: ColorMode::Solid,
            color1: Rgba::WHITE,
            color2: Rgba::opaque(0x5b, 0x8c, 0xff),
            point1: 0.0,
            point2: 100.0,
            threshold: 50.0,
        }
    }
}

impl ColorConfig {
    /// Colour for a cell with normalized luminance `luminance` in `[0, 255]`.
    pub fn resolve(&self, luminance: f32) -> Rgba {
        let p = if luminance.is_finite() {
            luminance.clamp(0.0, 255.0) / 255.0 * 100.0
        } else {
            0.0
        };
        match self.mode {
            ColorMode::Solid => self.color1,
            ColorMode::Gradient => two_stop(p, self.color1, self.color2, self.point1, self.point2),
            ColorMode::Glow => two_stop(
                p,
                self.color2,
                self.color2.transparent(),
                self.threshold,
                self.threshold,
            ),
        }
    }
}

fn two_stop(p: f32, from: Rgba, to: Rgba, point1: f32, point2: f32) -> Rgba {
    let (lo, hi) = if point1 <= point2 {
        (point1, point2)
    } else {
        (point2, point1)
    };
    if lo == hi {
        return if p < lo { from } else { to };
    }
    if p <= lo {
        from
    } else if p >= hi {
        to
    } else {
        from.lerp(to, (p - lo) / (hi - lo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("#fff".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!("#ff0000".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 0));
        let c: Rgba = "00ff0080".parse().unwrap();
        assert_eq!(c.a, 0x80);
        assert!("#12".parse::<Rgba>().is_err());
        assert!("#zzzzzz".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let c = Rgba::opaque(1, 2, 3);
        assert_eq!(c.to_string(), "#010203");
        assert_eq!(c.to_string().parse::<Rgba>().unwrap(), c);
    }

    #[test]
    fn test_gradient_stops() {
        let cfg = ColorConfig {
            mode: ColorMode::Gradient,
            color1: Rgba::BLACK,
            color2: Rgba::WHITE,
            point1: 25.0,
            point2: 75.0,
            ..Default::default()
        };
        assert_eq!(cfg.resolve(0.0), Rgba::BLACK);
        assert_eq!(cfg.resolve(255.0), Rgba::WHITE);
        let mid = cfg.resolve(127.5);
        assert!(mid.r > 120 && mid.r < 135);
    }

    #[test]
    fn test_gradient_equal_points_is_binary() {
        let cfg = ColorConfig {
            mode: ColorMode::Gradient,
            color1: Rgba::BLACK,
            color2: Rgba::WHITE,
            point1: 50.0,
            point2: 50.0,
            ..Default::default()
        };
        assert_eq!(cfg.resolve(100.0), Rgba::BLACK);
        assert_eq!(cfg.resolve(200.0), Rgba::WHITE);
    }

    #[test]
    fn test_glow_fades_to_transparent() {
        let cfg = ColorConfig {
            mode: ColorMode::Glow,
            threshold: 50.0,
            ..Default::default()
        };
        assert_eq!(cfg.resolve(10.0), cfg.color2);
        assert_eq!(cfg.resolve(250.0).a, 0);
    }

    #[test]
    fn test_glow_is_a_step_at_threshold() {
        let cfg = ColorConfig {
            mode: ColorMode::Glow,
            threshold: 50.0,
            ..Default::default()
        };
        // 127 / 255 is just under 50%, 128 / 255 just over
        assert_eq!(cfg.resolve(127.0).a, 255);
        assert_eq!(cfg.resolve(128.0).a, 0);
        for l in 0..=255 {
            let a = cfg.resolve(l as f32).a;
            assert!(a == 0 || a == 255);
        }
    }

    #[test]
    fn test_over_black() {
        let half = Rgba { a: 128, ..Rgba::WHITE };
        assert_eq!(half.over(Rgba::BLACK).r, 128);
    }
}
