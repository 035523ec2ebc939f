//! Configuration options for the Levenberg-Marquardt algorithm.
//!
//! This module defines the iteration limits, damping schedule and
//! differentiation step used by the fitter.

use serde::{Deserialize, Serialize};

use crate::error::{LmmcError, Result};
use crate::utils::finite_difference::DEFAULT_STEP;

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Chi-square improvement below which the fit has converged. Default: 1e-20
    pub tolerance: f64,

    /// Maximum number of iterations. Default: 500
    pub max_iterations: usize,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which lambda grows on a rejected step and shrinks on an
    /// accepted one. Default: 10.0
    pub lambda_factor: f64,

    /// Central difference step for the Jacobian. Default: 1e-4
    pub step: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-20,
            max_iterations: 500,
            initial_lambda: 1e-3,
            lambda_factor: 10.0,
            step: DEFAULT_STEP,
        }
    }
}

impl LmConfig {
    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance >= 0.0) {
            return Err(LmmcError::InvalidConfiguration(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(LmmcError::InvalidConfiguration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.initial_lambda > 0.0 && self.initial_lambda.is_finite()) {
            return Err(LmmcError::InvalidConfiguration(format!(
                "initial_lambda must be positive, got {}",
                self.initial_lambda
            )));
        }
        if !(self.lambda_factor > 1.0 && self.lambda_factor.is_finite()) {
            return Err(LmmcError::InvalidConfiguration(format!(
                "lambda_factor must be greater than 1, got {}",
                self.lambda_factor
            )));
        }
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(LmmcError::InvalidConfiguration(format!(
                "finite difference step must be positive, got {}",
                self.step
            )));
        }
        Ok(())
    }
}
