//! Random source seam for the classifier.
//!
//! Production wraps any `rand::Rng`; tests pin outcomes with
//! `ScriptedRandom` or sample distributions with a seeded `StdRng`.

use rand::rngs::ThreadRng;
use rand::Rng;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        let idx = (self.next_unit() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }

    /// Uniform draw in `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_unit()
    }
}

/// Adapter from any `rand` generator.
pub struct RngSource<R: Rng>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

impl RngSource<ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

/// Replays a fixed sequence of unit draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// # Panics
    /// If `draws` is empty.
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "ScriptedRandom needs at least one draw");
        Self { draws, cursor: 0 }
    }

    /// How many draws have been consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}
