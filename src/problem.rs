//! Problem definition for weighted nonlinear least squares.
//!
//! A `FitProblem` binds a model to a data set, the observed responses and
//! the per-point standard deviations used to weight residuals. It exposes
//! the quantities the Levenberg-Marquardt iteration needs: fitted values,
//! chi-square and the Jacobian with respect to the free parameters.

use ndarray::{Array1, Array2};

use crate::error::{LmmcError, Result};
use crate::model::{DataSet, ModelFunction};
use crate::utils::finite_difference;

/// Standard deviations of the observations.
#[derive(Debug, Clone, Copy)]
pub enum Deviations<'a> {
    /// Unknown; residuals are unweighted and the covariance is scaled by
    /// the residual variance at the solution.
    Unknown,

    /// The same deviation for every point.
    Uniform(f64),

    /// One deviation per point.
    PerPoint(&'a Array1<f64>),
}

impl Deviations<'_> {
    /// The deviation of point `i`, 1.0 when unknown.
    pub fn sigma(&self, i: usize) -> f64 {
        match self {
            Deviations::Unknown => 1.0,
            Deviations::Uniform(s) => *s,
            Deviations::PerPoint(s) => s[i],
        }
    }

    /// Whether the deviations were supplied by the caller.
    pub fn is_known(&self) -> bool {
        !matches!(self, Deviations::Unknown)
    }
}

/// A model fitted to observations over a data set.
pub struct FitProblem<'a, M: ModelFunction + ?Sized> {
    model: &'a M,
    data: &'a DataSet,
    observed: &'a Array1<f64>,
    deviations: Deviations<'a>,
}

impl<'a, M: ModelFunction + ?Sized> FitProblem<'a, M> {
    /// Create a new problem with unknown deviations.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if the observations do not match the data set,
    ///   or the data set does not match the model's variable count
    pub fn new(model: &'a M, data: &'a DataSet, observed: &'a Array1<f64>) -> Result<Self> {
        if observed.len() != data.len() {
            return Err(LmmcError::DimensionMismatch(format!(
                "expected {} observations, got {}",
                data.len(),
                observed.len()
            )));
        }
        if let Some(nvars) = model.variable_count() {
            if nvars != data.nvars() {
                return Err(LmmcError::DimensionMismatch(format!(
                    "model expects {} independent variables, data set has {}",
                    nvars,
                    data.nvars()
                )));
            }
        }

        Ok(Self {
            model,
            data,
            observed,
            deviations: Deviations::Unknown,
        })
    }

    /// Set the standard deviations of the observations.
    ///
    /// # Errors
    ///
    /// * `InvalidConfiguration` for non-positive or non-finite deviations
    /// * `DimensionMismatch` if per-point deviations do not match the data
    pub fn with_deviations(mut self, deviations: Deviations<'a>) -> Result<Self> {
        let valid = |s: f64| s.is_finite() && s > 0.0;
        match deviations {
            Deviations::Unknown => {}
            Deviations::Uniform(s) => {
                if !valid(s) {
                    return Err(LmmcError::InvalidConfiguration(format!(
                        "standard deviation must be positive, got {}",
                        s
                    )));
                }
            }
            Deviations::PerPoint(s) => {
                if s.len() != self.data.len() {
                    return Err(LmmcError::DimensionMismatch(format!(
                        "expected {} deviations, got {}",
                        self.data.len(),
                        s.len()
                    )));
                }
                if let Some(bad) = s.iter().find(|&&v| !valid(v)) {
                    return Err(LmmcError::InvalidConfiguration(format!(
                        "standard deviation must be positive, got {}",
                        bad
                    )));
                }
            }
        }
        self.deviations = deviations;
        Ok(self)
    }

    pub fn model(&self) -> &'a M {
        self.model
    }

    pub fn data(&self) -> &'a DataSet {
        self.data
    }

    pub fn observed(&self) -> &'a Array1<f64> {
        self.observed
    }

    pub fn deviations(&self) -> Deviations<'a> {
        self.deviations
    }

    /// Number of data points.
    pub fn point_count(&self) -> usize {
        self.data.len()
    }

    /// Model response at every point.
    pub fn fitted(&self, params: &[f64]) -> Array1<f64> {
        self.data.evaluate(self.model, params)
    }

    /// `Σ ((observed − fitted) / σ)²`
    pub fn chi_square(&self, fitted: &Array1<f64>) -> f64 {
        self.observed
            .iter()
            .zip(fitted.iter())
            .enumerate()
            .map(|(i, (y, f))| {
                let r = (y - f) / self.deviations.sigma(i);
                r * r
            })
            .sum()
    }

    /// Jacobian of the response with respect to the parameters in `free`.
    ///
    /// `params` is used as scratch space and is unchanged on return.
    pub fn jacobian(&self, params: &mut [f64], free: &[usize], step: f64) -> Array2<f64> {
        finite_difference::jacobian(self.model, self.data, params, free, step)
    }
}
