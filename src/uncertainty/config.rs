//! Configuration of a Monte Carlo run.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{LmmcError, Result};
use crate::lm::{FitResult, LmConfig};

/// Thresholds that discard an unreliable repetition.
///
/// A fit is discarded when, for any free parameter, the covariance diagonal
/// exceeds `covariance_factor · |truth|` or the fitted magnitude exceeds
/// `magnitude_factor · |truth|`, or either value is not finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierPolicy {
    /// Default: 10.0
    pub covariance_factor: f64,

    /// Default: 100.0
    pub magnitude_factor: f64,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            covariance_factor: 10.0,
            magnitude_factor: 100.0,
        }
    }
}

/// Why a repetition was discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Fitted value or variance of parameter `index` is NaN or infinite.
    NonFinite { index: usize },

    /// Variance of parameter `index` exceeds the covariance threshold.
    Covariance { index: usize, variance: f64 },

    /// Fitted value of parameter `index` exceeds the magnitude threshold.
    Magnitude { index: usize, value: f64 },
}

impl OutlierPolicy {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("covariance_factor", self.covariance_factor),
            ("magnitude_factor", self.magnitude_factor),
        ] {
            if v.is_nan() || v < 0.0 {
                return Err(LmmcError::InvalidConfiguration(format!(
                    "{} must be non-negative, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }

    /// Check a fit against the ground truth.
    ///
    /// `free` lists the free parameter indices in model order, matching the
    /// rows of the fit's covariance matrix.
    pub fn check(&self, fit: &FitResult, truth: &Array1<f64>, free: &[usize]) -> Option<Rejection> {
        for (j, &index) in free.iter().enumerate() {
            let value = fit.params[index];
            let variance = fit.covariance[[j, j]];
            let scale = truth[index].abs();

            if !value.is_finite() || !variance.is_finite() {
                return Some(Rejection::NonFinite { index });
            }
            if variance > self.covariance_factor * scale {
                return Some(Rejection::Covariance { index, variance });
            }
            if value.abs() > self.magnitude_factor * scale {
                return Some(Rejection::Magnitude { index, value });
            }
        }
        None
    }
}

/// Configuration options for a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of repetitions. Default: 10000
    pub nsims: usize,

    /// Standard deviation of the measurement noise. Must be positive.
    pub noise_sd: f64,

    /// Run seed; `None` derives one from the clock.
    pub seed: Option<u64>,

    /// Distribute repetitions over the rayon thread pool. Default: false
    pub parallel: bool,

    /// Outlier rejection thresholds
    pub outliers: OutlierPolicy,

    /// Fitter configuration used for every repetition
    pub lm: LmConfig,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            nsims: 10_000,
            noise_sd: 0.0,
            seed: None,
            parallel: false,
            outliers: OutlierPolicy::default(),
            lm: LmConfig::default(),
        }
    }
}

impl MonteCarloConfig {
    /// Default configuration with the given noise level.
    pub fn new(noise_sd: f64) -> Self {
        Self {
            noise_sd,
            ..Self::default()
        }
    }

    /// Load and validate a JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_nsims(mut self, nsims: usize) -> Self {
        self.nsims = nsims;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_outliers(mut self, outliers: OutlierPolicy) -> Self {
        self.outliers = outliers;
        self
    }

    pub fn with_lm(mut self, lm: LmConfig) -> Self {
        self.lm = lm;
        self
    }

    /// Check the run settings before any repetition starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.noise_sd.is_finite() && self.noise_sd > 0.0) {
            return Err(LmmcError::InvalidConfiguration(format!(
                "noise standard deviation must be positive, got {}",
                self.noise_sd
            )));
        }
        if self.nsims == 0 {
            return Err(LmmcError::InvalidConfiguration(
                "at least one repetition is required".to_string(),
            ));
        }
        self.outliers.validate()?;
        self.lm.validate()
    }
}
