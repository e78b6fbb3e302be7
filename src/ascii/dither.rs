//! Luminance quantization into palette indices, with optional dithering.
//!
//! Every algorithm walks the grid in row-major order. The error-diffusion
//! variants write ahead into `LuminanceBuffer::working`; the ignore-white
//! test always reads `LuminanceBuffer::original`.

use serde::{Deserialize, Serialize};

use super::grayscale::LuminanceBuffer;
use super::rng::SeededRng;

/// 4x4 Bayer threshold matrix, values 0..16.
#[rustfmt::skip]
pub const BAYER_4X4: [[u8; 4]; 4] = [
    [ 0,  8,  2, 10],
    [12,  4, 14,  6],
    [ 3, 11,  1,  9],
    [15,  7, 13,  5],
];

/// Quantization algorithm, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DitherAlgorithm {
    /// Direct rounding to the nearest level
    #[default]
    None,
    /// Floyd-Steinberg error diffusion
    Floyd,
    /// Atkinson error diffusion (six taps of 1/8)
    Atkinson,
    /// Seeded random offset per cell
    Noise,
    /// 4x4 Bayer threshold pattern
    Ordered,
}

impl DitherAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            DitherAlgorithm::None => "none",
            DitherAlgorithm::Floyd => "floyd",
            DitherAlgorithm::Atkinson => "atkinson",
            DitherAlgorithm::Noise => "noise",
            DitherAlgorithm::Ordered => "ordered",
        }
    }

    /// Whether this algorithm consumes the RNG.
    pub fn is_seeded(&self) -> bool {
        matches!(self, DitherAlgorithm::Noise)
    }
}

/// How cells whose sampled luminance is pure white are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteMode {
    /// Quantize white like any other value
    #[default]
    Keep,
    /// Render pure white as a blank cell
    Ignore,
}

/// Nearest level for a luminance value: `round(L / 255 * (n - 1))`.
#[inline]
pub fn nearest_index(luminance: f32, levels: usize) -> usize {
    if levels <= 1 {
        return 0;
    }
    let max = (levels - 1) as f32;
    let idx = (clamp_luma(luminance) / 255.0 * max).round();
    (idx as usize).min(levels - 1)
}

/// Luminance represented by a level: `index / (n - 1) * 255`.
#[inline]
pub fn level_value(index: usize, levels: usize) -> f32 {
    if levels <= 1 {
        return 0.0;
    }
    index as f32 / (levels - 1) as f32 * 255.0
}

/// Ordered-dither level for the cell at `(x, y)`. Pure in its inputs.
#[inline]
pub fn ordered_index(luminance: f32, x: u32, y: u32, levels: usize) -> usize {
    let levels = levels.max(1);
    let t = (BAYER_4X4[(y % 4) as usize][(x % 4) as usize] as f32 + 0.5) / 16.0;
    let v = (clamp_luma(luminance) / 255.0 + t - 0.5).clamp(0.0, 1.0);
    ((v * levels as f32).floor() as usize).min(levels - 1)
}

/// Noise-dither level; consumes exactly one draw from `rng`.
#[inline]
pub fn noise_index(luminance: f32, levels: usize, rng: &mut SeededRng) -> usize {
    let levels = levels.max(1);
    let noise = (rng.next() - 0.4) * (255.0 / levels as f32);
    let v = (clamp_luma(luminance) + noise).clamp(0.0, 255.0);
    nearest_index(v, levels)
}

/// Quantize every cell of `buffer` to a palette index.
///
/// Returns one entry per cell in row-major order; `None` marks a blank cell
/// produced by [`WhiteMode::Ignore`]. Blank cells propagate no error and do
/// not advance the RNG.
pub fn quantize(
    buffer: &mut LuminanceBuffer,
    levels: usize,
    algorithm: DitherAlgorithm,
    white_mode: WhiteMode,
    rng: &mut SeededRng,
) -> Vec<Option<usize>> {
    let levels = levels.max(1);
    let w = buffer.width as usize;
    let h = buffer.height as usize;
    let mut out = Vec::with_capacity(w * h);

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if white_mode == WhiteMode::Ignore && buffer.original[idx] == 255.0 {
                out.push(None);
                continue;
            }

            let l = clamp_luma(buffer.working[idx]);
            let level = match algorithm {
                DitherAlgorithm::None => nearest_index(l, levels),
                DitherAlgorithm::Floyd => {
                    let level = nearest_index(l, levels);
                    if levels > 1 {
                        let e = l - level_value(level, levels);
                        diffuse_floyd(&mut buffer.working, x, y, w, h, e);
                    }
                    level
                }
                DitherAlgorithm::Atkinson => {
                    let level = nearest_index(l, levels);
                    if levels > 1 {
                        let e = l - level_value(level, levels);
                        diffuse_atkinson(&mut buffer.working, x, y, w, h, e / 8.0);
                    }
                    level
                }
                DitherAlgorithm::Ordered => ordered_index(l, x as u32, y as u32, levels),
                DitherAlgorithm::Noise => noise_index(l, levels, rng),
            };
            out.push(Some(level));
        }
    }

    out
}

//       [*] 7/16
// 3/16 5/16 1/16
fn diffuse_floyd(buf: &mut [f32], x: usize, y: usize, w: usize, h: usize, e: f32) {
    let idx = y * w + x;
    if x + 1 < w {
        buf[idx + 1] += e * 7.0 / 16.0;
    }
    if y + 1 < h {
        let below = idx + w;
        if x > 0 {
            buf[below - 1] += e * 3.0 / 16.0;
        }
        buf[below] += e * 5.0 / 16.0;
        if x + 1 < w {
            buf[below + 1] += e / 16.0;
        }
    }
}

// Six taps of e/8; the remaining 2/8 of the error is dropped.
//      [*] 1  1
//   1   1  1
//       1
fn diffuse_atkinson(buf: &mut [f32], x: usize, y: usize, w: usize, h: usize, d: f32) {
    let idx = y * w + x;
    if x + 1 < w {
        buf[idx + 1] += d;
    }
    if x + 2 < w {
        buf[idx + 2] += d;
    }
    if y + 1 < h {
        let below = idx + w;
        if x > 0 {
            buf[below - 1] += d;
        }
        buf[below] += d;
        if x + 1 < w {
            buf[below + 1] += d;
        }
    }
    if y + 2 < h {
        buf[idx + 2 * w] += d;
    }
}

#[inline]
fn clamp_luma(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 255.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(w: u32, h: u32, v: f32) -> LuminanceBuffer {
        LuminanceBuffer::from_values(w, h, vec![v; (w * h) as usize])
    }

    #[test]
    fn test_mid_gray_standard_palette() {
        // round(128 / 255 * 8) = 4
        let mut buf = flat(10, 10, 128.0);
        let out = quantize(
            &mut buf,
            9,
            DitherAlgorithm::None,
            WhiteMode::Keep,
            &mut SeededRng::new(0),
        );
        assert!(out.iter().all(|&i| i == Some(4)));
    }

    #[test]
    fn test_single_level_never_propagates() {
        let mut buf = flat(4, 4, 90.0);
        let before = buf.working.clone();
        let out = quantize(
            &mut buf,
            1,
            DitherAlgorithm::Floyd,
            WhiteMode::Keep,
            &mut SeededRng::new(0),
        );
        assert!(out.iter().all(|&i| i == Some(0)));
        assert_eq!(buf.working, before);
    }

    #[test]
    fn test_floyd_first_cell_error_split() {
        // 2 levels, L = 100 -> index 0, error 100.
        let mut buf = flat(3, 2, 100.0);
        quantize(
            &mut buf,
            2,
            DitherAlgorithm::Floyd,
            WhiteMode::Keep,
            &mut SeededRng::new(0),
        );
        // Cell (0,1) receives 5/16 from (0,0) and 3/16 from (1,0), both of
        // which are computed from their own (error-adjusted) values.
        assert!(buf.working[3] > 100.0);
    }

    #[test]
    fn test_floyd_weights() {
        let mut buf = vec![0.0; 6];
        diffuse_floyd(&mut buf, 1, 0, 3, 2, 16.0);
        assert_eq!(buf, vec![0.0, 0.0, 7.0, 3.0, 5.0, 1.0]);
    }

    #[test]
    fn test_floyd_right_edge_skips_right_taps() {
        let mut buf = vec![0.0; 6];
        diffuse_floyd(&mut buf, 2, 0, 3, 2, 16.0);
        // Nothing wraps into the next row's first cell.
        assert_eq!(buf, vec![0.0, 0.0, 0.0, 0.0, 3.0, 5.0]);
    }

    #[test]
    fn test_floyd_quantize_matches_weights() {
        let mut buf = LuminanceBuffer::from_values(3, 2, vec![0.0, 100.0, 0.0, 0.0, 0.0, 0.0]);
        quantize(
            &mut buf,
            2,
            DitherAlgorithm::Floyd,
            WhiteMode::Keep,
            &mut SeededRng::new(0),
        );
        assert_eq!(buf.working[2], 43.75);
        assert_eq!(buf.working[3], 18.75);
    }

    #[test]
    fn test_atkinson_taps_from_corner() {
        let mut buf = LuminanceBuffer::from_values(4, 3, {
            let mut v = vec![0.0; 12];
            v[0] = 64.0;
            v
        });
        // Only process the first cell's diffusion by hand.
        diffuse_atkinson(&mut buf.working, 0, 0, 4, 3, 8.0);
        assert_eq!(buf.working[1], 8.0);
        assert_eq!(buf.working[2], 8.0);
        assert_eq!(buf.working[4], 8.0);
        assert_eq!(buf.working[5], 8.0);
        assert_eq!(buf.working[8], 8.0);
        // No wraparound to the previous row's end, no x+3.
        assert_eq!(buf.working[3], 0.0);
    }

    #[test]
    fn test_ordered_is_pure() {
        for y in 0..8 {
            for x in 0..8 {
                let a = ordered_index(100.0, x, y, 5);
                let b = ordered_index(100.0, x, y, 5);
                assert_eq!(a, b);
                assert_eq!(a, ordered_index(100.0, x % 4, y % 4, 5));
            }
        }
    }

    #[test]
    fn test_ordered_extremes_in_range() {
        assert_eq!(ordered_index(255.0, 3, 3, 4), 3);
        assert_eq!(ordered_index(0.0, 0, 0, 4), 0);
    }

    #[test]
    fn test_noise_deterministic_for_seed() {
        let run = || {
            let mut buf = flat(16, 8, 120.0);
            quantize(
                &mut buf,
                10,
                DitherAlgorithm::Noise,
                WhiteMode::Keep,
                &mut SeededRng::new(1234),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_ignore_white_uses_original_value() {
        // Working copy diverges, but the blank test must read the original.
        let mut buf = flat(2, 1, 255.0);
        buf.working[1] = 10.0;
        let out = quantize(
            &mut buf,
            2,
            DitherAlgorithm::Floyd,
            WhiteMode::Ignore,
            &mut SeededRng::new(0),
        );
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn test_ignore_white_skips_rng_draw() {
        let mut buf = LuminanceBuffer::from_values(3, 1, vec![255.0, 80.0, 80.0]);
        let mut rng = SeededRng::new(5);
        quantize(&mut buf, 4, DitherAlgorithm::Noise, WhiteMode::Ignore, &mut rng);
        let mut expected = SeededRng::new(5);
        expected.next();
        expected.next();
        assert_eq!(rng.state(), expected.state());
    }

    #[test]
    fn test_indices_always_in_range() {
        let values: Vec<f32> = (0..256).map(|v| v as f32).collect();
        for algo in [
            DitherAlgorithm::None,
            DitherAlgorithm::Floyd,
            DitherAlgorithm::Atkinson,
            DitherAlgorithm::Noise,
            DitherAlgorithm::Ordered,
        ] {
            for levels in [1, 2, 9, 70] {
                let mut buf = LuminanceBuffer::from_values(16, 16, values.clone());
                let out = quantize(
                    &mut buf,
                    levels,
                    algo,
                    WhiteMode::Keep,
                    &mut SeededRng::new(99),
                );
                assert!(out.iter().flatten().all(|&i| i < levels), "{:?}", algo);
            }
        }
    }
}
