//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the damped Gauss-Newton iteration over a
//! [`FitProblem`], with a subset of the parameters held fixed, and the
//! covariance estimate at the solution.

use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{LmmcError, Result};
use crate::model::{ModelFunction, ParameterMask};
use crate::problem::FitProblem;
use crate::utils::gauss_jordan;

use super::config::LmConfig;
use super::convergence::{self, FitStatus};
use super::step;

/// Result of a Levenberg-Marquardt fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    /// Adjusted parameter values, in model order
    pub params: Array1<f64>,

    /// Covariance of the free parameters (`mfit × mfit`, free parameters in
    /// model order)
    pub covariance: Array2<f64>,

    /// Chi-square at the adjusted parameters
    pub chi_square: f64,

    /// Chi-square of the last candidate minus the chi-square before it
    pub delta: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// How the iteration terminated
    pub status: FitStatus,
}

impl FitResult {
    /// Variance estimates of the free parameters (covariance diagonal).
    pub fn variances(&self) -> Array1<f64> {
        self.covariance.diag().to_owned()
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fit Result:")?;
        writeln!(f, "  Status: {}", self.status.description())?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Chi-square: {:.4e}", self.chi_square)?;
        writeln!(f, "  Delta: {:.4e}", self.delta)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt fitter.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new fitter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new fitter with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    /// Set the chi-square convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the damping growth/shrink factor.
    pub fn with_lambda_factor(mut self, factor: f64) -> Self {
        self.config.lambda_factor = factor;
        self
    }

    /// Set the finite difference step.
    pub fn with_step(mut self, step: f64) -> Self {
        self.config.step = step;
        self
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Fit the free parameters of `problem`, starting from `guess`.
    ///
    /// # Arguments
    ///
    /// * `problem` - Model, data, observations and deviations
    /// * `guess` - Starting parameter values in model order
    /// * `mask` - Which parameters are adjusted
    ///
    /// # Errors
    ///
    /// * `InvalidConfiguration` / `DimensionMismatch` for unusable inputs
    /// * `SingularMatrix` if a step or the covariance cannot be solved
    pub fn fit<M: ModelFunction + ?Sized>(
        &self,
        problem: &FitProblem<'_, M>,
        guess: &Array1<f64>,
        mask: &ParameterMask,
    ) -> Result<FitResult> {
        self.config.validate()?;
        let m = guess.len();
        if mask.len() != m {
            return Err(LmmcError::DimensionMismatch(format!(
                "mask covers {} parameters, guess has {}",
                mask.len(),
                m
            )));
        }
        if let Some(expected) = problem.model().parameter_count() {
            if expected != m {
                return Err(LmmcError::DimensionMismatch(format!(
                    "model expects {} parameters, got {}",
                    expected, m
                )));
            }
        }
        let free = mask.free_indices();
        if free.is_empty() {
            return Err(LmmcError::InvalidConfiguration(
                "at least one parameter must be free".to_string(),
            ));
        }

        let step = self.config.step;
        let factor = self.config.lambda_factor;
        let observed = problem.observed();
        let sigma = |i: usize| problem.deviations().sigma(i);

        // Working parameters stay in model order; `free` addresses the
        // adjustable ones, so the fixed values are never touched.
        let mut params = guess.to_vec();
        let mut candidate = params.clone();

        let mut fitted = problem.fitted(&params);
        let mut jac = problem.jacobian(&mut params, &free, step);
        let mut chi_square = problem.chi_square(&fitted);
        let mut lambda = self.config.initial_lambda;
        let mut conv;
        let mut iterations = 0;

        let status = loop {
            iterations += 1;

            let residuals = observed - &fitted;
            let (alpha, beta) = step::curvature(&jac, &residuals, sigma, lambda);
            let delta = step::increment(alpha, beta)?;

            for (j, &k) in free.iter().enumerate() {
                candidate[k] = params[k] + delta[j];
            }
            let candidate_fitted = problem.fitted(&candidate);
            let candidate_chi_square = problem.chi_square(&candidate_fitted);
            conv = chi_square - candidate_chi_square;

            let accepted = conv > 0.0 || candidate_chi_square == 0.0;
            if accepted {
                params.copy_from_slice(&candidate);
                fitted = candidate_fitted;
                chi_square = candidate_chi_square;
                jac = problem.jacobian(&mut params, &free, step);
                lambda /= factor;
            } else {
                // the model is pure, so the retained response and Jacobian
                // are still valid
                candidate.copy_from_slice(&params);
                lambda *= factor;
            }

            trace!(iterations, chi_square, lambda, accepted, "lm iteration");

            if let Some(status) = convergence::check(
                chi_square,
                conv,
                self.config.tolerance,
                iterations,
                self.config.max_iterations,
            ) {
                break status;
            }
        };

        let covariance = self.covariance(problem, &jac, &fitted)?;

        debug!(?status, iterations, chi_square, "lm fit finished");

        Ok(FitResult {
            params: Array1::from_vec(params),
            covariance,
            chi_square,
            delta: -conv,
            iterations,
            status,
        })
    }

    /// Invert the undamped curvature matrix at the solution.
    fn covariance<M: ModelFunction + ?Sized>(
        &self,
        problem: &FitProblem<'_, M>,
        jac: &Array2<f64>,
        fitted: &Array1<f64>,
    ) -> Result<Array2<f64>> {
        let residuals = problem.observed() - fitted;

        let (alpha, _) = if problem.deviations().is_known() {
            let deviations = problem.deviations();
            step::curvature(jac, &residuals, |i| deviations.sigma(i), 0.0)
        } else {
            // residual standard deviation stands in for the unknown σ
            let n = residuals.len() as f64;
            let variance = residuals.iter().map(|r| r * r).sum::<f64>() / n;
            let s = if variance > 0.0 { variance.sqrt() } else { 1.0 };
            step::curvature(jac, &residuals, |_| s, 0.0)
        };

        gauss_jordan::invert(&alpha)
    }
}
