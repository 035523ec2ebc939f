//! Park-Miller "minimal standard" multiplicative generator.
//!
//! `state ← 16807 · state mod (2^31 − 1)`, computed with Schrage's
//! factorization so every intermediate fits in 32 bits. Each instance owns
//! its state; there is no global generator.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Error, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

const IA: i32 = 16807;
const IM: i32 = 2_147_483_647;
const IQ: i32 = 127_773;
const IR: i32 = 2836;

/// A seeded Lehmer generator with period `2^31 − 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinStd {
    state: i32,
}

impl MinStd {
    /// Create a generator from any 64-bit seed.
    ///
    /// The seed is folded into `[1, 2^31 − 2]`; zero is never a state.
    pub fn new(seed: u64) -> Self {
        let state = (seed % (IM as u64 - 1)) as i32 + 1;
        Self { state }
    }

    /// Create a generator seeded from the system clock.
    pub fn from_time() -> Self {
        Self::new(time_seed())
    }

    /// Current internal state.
    pub fn state(&self) -> i32 {
        self.state
    }

    /// Advance and return the new state in `[1, 2^31 − 2]`.
    pub fn next_state(&mut self) -> i32 {
        let k = self.state / IQ;
        self.state = IA * (self.state - k * IQ) - IR * k;
        if self.state < 0 {
            self.state += IM;
        }
        self.state
    }

    /// Uniform deviate in the open interval `(0, 1)`.
    pub fn next_uniform(&mut self) -> f64 {
        f64::from(self.next_state()) / f64::from(IM)
    }
}

impl RngCore for MinStd {
    fn next_u32(&mut self) -> u32 {
        // top 16 of the 31 state bits from two steps
        let hi = (self.next_state() as u32) >> 15;
        let lo = (self.next_state() as u32) >> 15;
        (hi << 16) | lo
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for MinStd {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

/// A seed derived from the current wall-clock time.
pub fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()).rotate_left(32))
        .unwrap_or(1)
}
