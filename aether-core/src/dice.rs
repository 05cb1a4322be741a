//! Randomness for the rules engine.
//!
//! Every random decision in the game is a draw from a uniform `[0, 1)`
//! source. Picking one of `N` entries uses `floor(rand() * N)`, percentage
//! checks compare against the draw directly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A uniform `[0, 1)` generator.
pub trait RandomSource {
    /// Next value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform index into a collection of `len` entries.
    ///
    /// Returns 0 for an empty collection; callers index with `get`.
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let index = (self.next_f64() * len as f64).floor() as usize;
        index.min(len - 1)
    }

    /// Uniform integer in `[low, high]`.
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as usize;
        low + self.pick_index(span) as u32
    }
}

/// Pick one entry of a slice uniformly.
pub fn pick<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.pick_index(items.len()))
}

/// Thread-local OS-seeded generator. The default for real play.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic generator seeded from a `u64` (useful for testing).
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}
