//! Seeded pseudo-random generator for reproducible noise dithering.

/// Linear congruential generator over a single 32-bit state.
///
/// Uses the Numerical Recipes constants (`a = 1664525`, `c = 1013904223`,
/// modulus 2^32). The same seed always yields the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current state; feeding it back to [`SeededRng::new`] resumes the sequence.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance the state and return a value in `[0, 1)`.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        // Top 24 bits fit an f32 mantissa exactly, so the result stays below 1.0.
        (self.state >> 8) as f32 / 16_777_216.0
    }
}

/// A fresh seed from the wall clock, for the static effect's per-tick reseed.
pub fn random_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    // Fold the 128-bit nanos so consecutive ticks differ in the low bits.
    (nanos ^ (nanos >> 32) ^ (nanos >> 64)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_values_in_unit_interval() {
        let mut rng = SeededRng::new(7);
        for _ in 0..10_000 {
            let v = rng.next();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_state_resumes_sequence() {
        let mut a = SeededRng::new(1);
        a.next();
        let mut b = SeededRng::new(a.state());
        assert_eq!(a.next(), b.next());
    }
}
