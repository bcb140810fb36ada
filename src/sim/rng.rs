//! Seeded random stream
//!
//! Every random decision in the simulation is drawn from here so a run can be
//! replayed from its seed string.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// Hash a seed string into the 64-bit PCG seed (FNV-1a, stable across platforms)
fn hash_seed(seed: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    seed.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(PRIME)
    })
}

/// Deterministic PRNG keyed by a seed string
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: String,
    rng: Pcg32,
}

impl SimRng {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_owned(),
            rng: Pcg32::seed_from_u64(hash_seed(seed)),
        }
    }

    /// The seed this stream was created from
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Uniform float in [0, 1)
    pub fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform integer in `[at_least, at_most]`
    pub fn random_int(&mut self, at_least: i32, at_most: i32) -> i32 {
        debug_assert!(at_least <= at_most);
        let span = (at_most - at_least + 1) as f32;
        let value = (self.random() * span).floor() as i32 + at_least;
        // f32 rounding can land exactly on the upper bound + 1
        value.min(at_most)
    }

    /// Draw a new seed string from this stream
    pub fn fresh_seed(&mut self) -> String {
        format!("{:016x}", self.rng.next_u64())
    }
}
