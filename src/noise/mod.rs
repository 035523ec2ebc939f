//! Seeded Gaussian noise for synthetic data.
//!
//! The default stream is a [`NoiseGenerator`] (polar method) over a
//! [`MinStd`] uniform generator. Every stream is a plain value owned by its
//! user, so concurrent Monte Carlo repetitions never share generator state.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

pub mod minstd;
pub mod polar;

pub use minstd::{time_seed, MinStd};
pub use polar::{NoiseGenerator, RandUniform, UniformSource};

/// A source of independent standard-normal deviates.
pub trait NoiseSource {
    fn next_deviate(&mut self) -> f64;
}

/// Standard-normal deviates from `rand_distr` over any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandNoise<R> {
    rng: R,
}

impl<R: Rng> RandNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> NoiseSource for RandNoise<R> {
    fn next_deviate(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }
}

/// Seeds of the first `count` repetition streams of a run.
///
/// Drawn in order from a `StdRng` seeded with the run seed, so entry `r`
/// depends only on `(base, r)` and not on how repetitions are scheduled.
pub fn repetition_seeds(base: u64, count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(base);
    (0..count).map(|_| rng.next_u64()).collect()
}
