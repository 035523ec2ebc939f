//! Standard-normal deviates by Marsaglia's polar form of Box-Muller.

use rand::Rng;

use super::minstd::MinStd;
use super::NoiseSource;

/// A source of uniform deviates in `(0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl UniformSource for MinStd {
    fn next_uniform(&mut self) -> f64 {
        MinStd::next_uniform(self)
    }
}

/// Uniform deviates from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandUniform<R>(pub R);

impl<R: Rng> UniformSource for RandUniform<R> {
    fn next_uniform(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Polar-method Gaussian generator over a uniform stream.
///
/// Deviates are produced in pairs; the second one of each pair is cached
/// and returned by the next call.
#[derive(Debug, Clone)]
pub struct NoiseGenerator<U = MinStd> {
    uniform: U,
    cached: Option<f64>,
}

impl NoiseGenerator<MinStd> {
    /// Gaussian stream over a Park-Miller generator with the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(MinStd::new(seed))
    }

    /// Gaussian stream seeded from the system clock.
    pub fn from_time() -> Self {
        Self::new(MinStd::from_time())
    }
}

impl<U: UniformSource> NoiseGenerator<U> {
    /// Wrap a uniform source.
    pub fn new(uniform: U) -> Self {
        Self {
            uniform,
            cached: None,
        }
    }

    /// Next standard-normal deviate.
    pub fn next_deviate(&mut self) -> f64 {
        if let Some(v) = self.cached.take() {
            return v;
        }

        loop {
            let u1 = 2.0 * self.uniform.next_uniform() - 1.0;
            let u2 = 2.0 * self.uniform.next_uniform() - 1.0;
            let r2 = u1 * u1 + u2 * u2;
            if r2 > 0.0 && r2 < 1.0 {
                let fac = (-2.0 * r2.ln() / r2).sqrt();
                self.cached = Some(u2 * fac);
                return u1 * fac;
            }
        }
    }

    /// True when the next call returns the cached half of a pair.
    pub fn has_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// The underlying uniform source.
    pub fn uniform(&self) -> &U {
        &self.uniform
    }
}

impl<U: UniformSource> NoiseSource for NoiseGenerator<U> {
    fn next_deviate(&mut self) -> f64 {
        NoiseGenerator::next_deviate(self)
    }
}
