//! Unit tests for the luminance-to-glyph stages.
//!
//! These tests verify the core conversion algorithms:
//! - Luminance and photometric normalization
//! - Palette resolution
//! - Quantization and dithering determinism
//! - Grid dimensions

use glyphgrid::ascii::*;
use std::collections::HashMap;

const ALL_ALGORITHMS: [DitherAlgorithm; 5] = [
    DitherAlgorithm::None,
    DitherAlgorithm::Floyd,
    DitherAlgorithm::Atkinson,
    DitherAlgorithm::Noise,
    DitherAlgorithm::Ordered,
];

/// Pseudo-random luminance buffer (values in [0, 255]).
fn noisy_buffer(width: u32, height: u32, seed: u32) -> LuminanceBuffer {
    let mut rng = SeededRng::new(seed);
    let values = (0..width * height).map(|_| rng.next() * 255.0).collect();
    LuminanceBuffer::from_values(width, height, values)
}

fn flat_rgba(w: u32, h: u32, v: u8) -> Vec<u8> {
    [v, v, v, 255].repeat((w * h) as usize)
}

// ==================== Luminance Tests ====================

#[test]
fn test_luminance_pure_channels() {
    // 299 * 255 / 1000, 587 * 255 / 1000, 114 * 255 / 1000
    assert!((luminance(255, 0, 0) - 76.245).abs() < 1e-3);
    assert!((luminance(0, 255, 0) - 149.685).abs() < 1e-3);
    assert!((luminance(0, 0, 255) - 29.07).abs() < 1e-3);
}

#[test]
fn test_luminance_gray_is_exact() {
    for v in [0u8, 1, 64, 127, 128, 200, 254, 255] {
        assert_eq!(luminance(v, v, v), v as f32);
    }
}

#[test]
fn test_identity_normalization() {
    let rgba: Vec<u8> = (0..=255u8).flat_map(|v| [v, 255 - v, v / 2, 255]).collect();
    let buffer = normalize(&rgba, 256, 1, &Photometric::default());
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        assert_eq!(buffer.original[i], luminance(px[0], px[1], px[2]));
    }
    assert_eq!(buffer.original, buffer.working);
}

#[test]
fn test_contrast_factor_formula() {
    let params = Photometric {
        contrast: 100.0,
        ..Default::default()
    };
    let expected = 259.0 * 355.0 / (255.0 * 159.0);
    assert!((params.contrast_factor() - expected).abs() < 1e-5);
}

#[test]
fn test_extreme_contrast_stays_in_range() {
    for contrast in [-1000.0, -258.0, 258.0, 259.0, 1000.0, f32::NAN] {
        let params = Photometric {
            contrast,
            brightness: 10.0,
            invert: false,
        };
        let buffer = normalize(&flat_rgba(4, 4, 90), 4, 4, &params);
        assert!(buffer
            .original
            .iter()
            .all(|l| l.is_finite() && (0.0..=255.0).contains(l)));
    }
}

// ==================== Palette Tests ====================

#[test]
fn test_palette_never_empty() {
    let empty = HashMap::new();
    let mut with_blank = HashMap::new();
    with_blank.insert("blank".to_string(), String::new());

    for name in ["", "nope", "custom", "CUSTOM", "blank", "detailed", "hex"] {
        for custom in ["", "ab"] {
            assert!(resolve_palette(name, custom, None).len() >= 1);
            assert!(resolve_palette(name, custom, Some(&empty)).len() >= 1);
            assert!(resolve_palette(name, custom, Some(&with_blank)).len() >= 1);
        }
    }
}

#[test]
fn test_empty_custom_is_single_space() {
    let palette = resolve_palette("custom", "", None);
    assert_eq!(palette.glyphs(), &[' ']);
}

#[test]
fn test_unknown_palette_falls_back_to_detailed() {
    let palette = resolve_palette("does-not-exist", "", None);
    assert_eq!(palette.len(), DETAILED_CHARSET.chars().count());
}

#[test]
fn test_builtin_palettes() {
    assert_eq!(resolve_palette("standard", "", None).len(), 9);
    assert_eq!(resolve_palette("blocks", "", None).glyph(0), '█');
    assert_eq!(resolve_palette("binary", "", None).glyphs(), &['0', '1']);
    assert_eq!(resolve_palette("hex", "", None).len(), 16);
}

// ==================== Quantization Tests ====================

#[test]
fn test_quantize_indices_in_bounds() {
    for levels in 1..=12 {
        for algorithm in ALL_ALGORITHMS {
            let mut buffer = noisy_buffer(9, 7, levels as u32);
            let mut rng = SeededRng::new(3);
            let out = quantize(&mut buffer, levels, algorithm, WhiteMode::Keep, &mut rng);
            assert_eq!(out.len(), 63);
            for idx in out {
                let i = idx.expect("keep mode never blanks");
                assert!(i < levels, "{:?}: {} >= {}", algorithm, i, levels);
            }
        }
    }
}

#[test]
fn test_quantize_extreme_luminance() {
    let mut buffer = LuminanceBuffer::from_values(4, 1, vec![0.0, 255.0, 0.0, 255.0]);
    let mut rng = SeededRng::new(0);
    let out = quantize(&mut buffer, 9, DitherAlgorithm::Floyd, WhiteMode::Keep, &mut rng);
    assert_eq!(out, vec![Some(0), Some(8), Some(0), Some(8)]);
}

#[test]
fn test_mid_gray_standard_index() {
    let mut buffer = LuminanceBuffer::from_values(3, 3, vec![128.0; 9]);
    let mut rng = SeededRng::new(0);
    let out = quantize(&mut buffer, 9, DitherAlgorithm::None, WhiteMode::Keep, &mut rng);
    assert!(out.iter().all(|i| *i == Some(4)));
}

#[test]
fn test_noise_is_deterministic_for_seed() {
    let run = |seed| {
        let mut buffer = noisy_buffer(16, 16, 42);
        let mut rng = SeededRng::new(seed);
        quantize(&mut buffer, 9, DitherAlgorithm::Noise, WhiteMode::Keep, &mut rng)
    };
    assert_eq!(run(1234), run(1234));
    assert_ne!(run(1234), run(4321));
}

#[test]
fn test_ordered_is_pure() {
    let mut a = noisy_buffer(8, 8, 5);
    let mut b = a.clone();
    let out_a = quantize(
        &mut a,
        5,
        DitherAlgorithm::Ordered,
        WhiteMode::Keep,
        &mut SeededRng::new(1),
    );
    let out_b = quantize(
        &mut b,
        5,
        DitherAlgorithm::Ordered,
        WhiteMode::Keep,
        &mut SeededRng::new(999),
    );
    assert_eq!(out_a, out_b);
    // No diffusion: the working buffer is untouched
    assert_eq!(a.working, a.original);

    let buffer = noisy_buffer(8, 8, 5);
    for y in 0..8 {
        for x in 0..8 {
            let l = buffer.original[buffer.index(x, y)];
            assert_eq!(
                out_a[buffer.index(x, y)],
                Some(dither::ordered_index(l, x, y, 5))
            );
        }
    }
}

#[test]
fn test_ignore_white_blanks_and_stops_error() {
    for algorithm in [DitherAlgorithm::Floyd, DitherAlgorithm::Atkinson] {
        let mut buffer = LuminanceBuffer::from_values(3, 1, vec![255.0, 100.0, 100.0]);
        let mut rng = SeededRng::new(0);
        let out = quantize(&mut buffer, 4, algorithm, WhiteMode::Ignore, &mut rng);
        assert_eq!(out[0], None);
        // The blank cell diffused nothing into its neighbour
        assert!(out[1].is_some());
        assert_eq!(buffer.working[1], 100.0);
    }
}

#[test]
fn test_ignore_white_keeps_rng_sequence() {
    let mut with_white = LuminanceBuffer::from_values(3, 1, vec![255.0, 80.0, 170.0]);
    let mut without = LuminanceBuffer::from_values(2, 1, vec![80.0, 170.0]);
    let a = quantize(
        &mut with_white,
        6,
        DitherAlgorithm::Noise,
        WhiteMode::Ignore,
        &mut SeededRng::new(77),
    );
    let b = quantize(
        &mut without,
        6,
        DitherAlgorithm::Noise,
        WhiteMode::Keep,
        &mut SeededRng::new(77),
    );
    assert_eq!(&a[1..], &b[..]);
}

#[test]
fn test_ignore_white_only_exact_white() {
    let mut buffer = LuminanceBuffer::from_values(2, 1, vec![254.9, 255.0]);
    let out = quantize(
        &mut buffer,
        9,
        DitherAlgorithm::None,
        WhiteMode::Ignore,
        &mut SeededRng::new(0),
    );
    assert_eq!(out, vec![Some(8), None]);
}

// ==================== Dimension Tests ====================

#[test]
fn test_grid_dimensions_at_least_one() {
    for (w, h) in [(0, 0), (1, 1), (1000, 1), (1, 1000), (640, 480)] {
        for cols in [0, 1, 7, 100] {
            for aspect in [0.0, 0.55, 1.0, f32::INFINITY] {
                let (c, r) = grid_dimensions(w, h, cols, aspect);
                assert!(c >= 1 && r >= 1);
                assert_eq!(c, cols.max(1));
            }
        }
    }
}

#[test]
fn test_grid_dimensions_square_default_aspect() {
    // round(1 * 100 * 0.55)
    assert_eq!(grid_dimensions(50, 50, 100, DEFAULT_FONT_ASPECT_RATIO), (100, 55));
}

// ==================== RNG Tests ====================

#[test]
fn test_rng_resume_from_state() {
    let mut a = SeededRng::new(11);
    a.next();
    let mut b = SeededRng::new(a.state());
    assert_eq!(a.next(), b.next());
}

#[test]
fn test_rng_range() {
    let mut rng = SeededRng::new(u32::MAX);
    for _ in 0..10_000 {
        let v = rng.next();
        assert!((0.0..1.0).contains(&v));
    }
}
