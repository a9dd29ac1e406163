//! Injectable randomness.
//!
//! Every random decision the engine makes goes through [`RandomSource`], so
//! tests can script exact outcomes and the shell can seed a reproducible run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform integer in `[0, 100)`.
    fn roll_percent(&mut self, reason: &str) -> u32;

    /// Unbiased true/false.
    fn coin_flip(&mut self, reason: &str) -> bool;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize, reason: &str) -> usize;

    /// Uniform float in `[0, 1)`.
    fn roll_unit(&mut self, reason: &str) -> f64;
}

/// Random source backed by a seedable standard generator.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRng {
    fn roll_percent(&mut self, reason: &str) -> u32 {
        let roll = self.inner.random_range(0..100);
        log::trace!("[rng] {} -> {}", reason, roll);
        roll
    }

    fn coin_flip(&mut self, reason: &str) -> bool {
        let flip = self.inner.random_bool(0.5);
        log::trace!("[rng] {} -> {}", reason, flip);
        flip
    }

    fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        let index = self.inner.random_range(0..len.max(1));
        log::trace!("[rng] {} -> {}", reason, index);
        index
    }

    fn roll_unit(&mut self, reason: &str) -> f64 {
        let roll: f64 = self.inner.random();
        log::trace!("[rng] {} -> {:.4}", reason, roll);
        roll
    }
}

/// Replays a fixed list of unit values in `[0, 1)`.
///
/// Each call consumes one value and maps it onto the requested range:
/// `roll_percent` takes `floor(v * 100)`, `coin_flip` is `v < 0.5`,
/// `pick_index` takes `floor(v * len)`.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    outcomes: Vec<f64>,
    index: usize,
}

impl ScriptedRng {
    pub fn new(outcomes: Vec<f64>) -> Self {
        Self { outcomes, index: 0 }
    }

    /// Number of outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.outcomes.len() - self.index
    }

    fn next_outcome(&mut self, reason: &str) -> f64 {
        if self.index >= self.outcomes.len() {
            panic!(
                "ScriptedRng exhausted! Tried to get a value for: '{}'. Need more outcomes.",
                reason
            );
        }
        let outcome = self.outcomes[self.index].clamp(0.0, 0.999_999);
        self.index += 1;

        #[cfg(test)]
        println!("[RNG] Consumed {} for: {}", outcome, reason);

        outcome
    }
}

impl RandomSource for ScriptedRng {
    fn roll_percent(&mut self, reason: &str) -> u32 {
        (self.next_outcome(reason) * 100.0).floor() as u32
    }

    fn coin_flip(&mut self, reason: &str) -> bool {
        self.next_outcome(reason) < 0.5
    }

    fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        let index = (self.next_outcome(reason) * len as f64).floor() as usize;
        index.min(len.saturating_sub(1))
    }

    fn roll_unit(&mut self, reason: &str) -> f64 {
        self.next_outcome(reason)
    }
}
