//! Seedable random source shared by every stochastic component.
//!
//! All randomness in a run flows through one [`RandomSource`], consumed in a
//! fixed order: regime schedule first, then per step the labor-market draws
//! followed by the growth-noise draw.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{Result, SimulationError};

/// Explicitly seeded random source.
#[derive(Clone, Debug)]
pub struct RandomSource {
    rng: StdRng,
    seed: u64,
    draws: u64,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Seed this source was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Sample `Normal(mean, std)`.
    pub fn normal(&mut self, mean: f64, std: f64) -> Result<f64> {
        let dist = Normal::new(mean, std)
            .map_err(|source| SimulationError::Distribution { mean, std, source })?;
        self.draws += 1;
        Ok(dist.sample(&mut self.rng))
    }

    /// Uniform integer in `[low, high)`. Returns `low` when the range is empty.
    pub fn uniform_int(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.draws += 1;
        self.rng.gen_range(low..high)
    }

    /// Uniform real in `[low, high)`. Returns `low` when the range is empty.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !(high > low) {
            return low;
        }
        self.draws += 1;
        self.rng.gen_range(low..high)
    }

    /// Draw a fresh seed for an independent source.
    pub fn next_seed(&mut self) -> u64 {
        self.draws += 1;
        self.rng.gen()
    }
}

/// Mix a master seed with a sample index (splitmix64 finaliser).
pub fn derive_seed(master: u64, index: u64) -> u64 {
    let mut z = master.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
