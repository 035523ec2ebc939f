//! Model capability trait and the data containers fits operate on.
//!
//! This module defines the `ModelFunction` trait, which any pure response
//! function `f(vars, params) -> f64` can implement, the immutable `Model`
//! descriptor stored in the registry, the `DataSet` of independent-variable
//! points, and the `ParameterMask` selecting which parameters are fitted.

use std::fmt;

use ndarray::Array1;

use crate::error::{LmmcError, Result};

/// A pure mapping from (independent variables, parameters) to a scalar response.
///
/// Implementations must be deterministic: the fitter relies on repeated
/// evaluations at the same point returning the same value.
pub trait ModelFunction {
    /// Evaluate the model response at one point.
    ///
    /// # Arguments
    ///
    /// * `vars` - The independent-variable values of the point
    /// * `params` - The full parameter vector, in model order
    fn evaluate(&self, vars: &[f64], params: &[f64]) -> f64;

    /// Number of parameters the model expects, when known.
    fn parameter_count(&self) -> Option<usize> {
        None
    }

    /// Number of independent variables the model expects, when known.
    fn variable_count(&self) -> Option<usize> {
        None
    }
}

impl<F> ModelFunction for F
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    fn evaluate(&self, vars: &[f64], params: &[f64]) -> f64 {
        self(vars, params)
    }
}

/// Immutable descriptor of a registered model.
#[derive(Clone, Copy)]
pub struct Model {
    name: &'static str,
    parameter_names: &'static [&'static str],
    variable_names: &'static [&'static str],
    function: fn(&[f64], &[f64]) -> f64,
}

impl Model {
    /// Create a new model descriptor.
    pub const fn new(
        name: &'static str,
        parameter_names: &'static [&'static str],
        variable_names: &'static [&'static str],
        function: fn(&[f64], &[f64]) -> f64,
    ) -> Self {
        Self {
            name,
            parameter_names,
            variable_names,
            function,
        }
    }

    /// The registry name of the model.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ordered parameter names.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        self.parameter_names
    }

    /// Ordered independent-variable names.
    pub fn variable_names(&self) -> &'static [&'static str] {
        self.variable_names
    }

    /// Number of parameters.
    pub fn nparams(&self) -> usize {
        self.parameter_names.len()
    }

    /// Number of independent variables.
    pub fn nvars(&self) -> usize {
        self.variable_names.len()
    }

    /// Position of a parameter by name.
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameter_names.iter().position(|p| *p == name)
    }

    /// Check that a parameter vector and a data set fit this model.
    pub fn check(&self, params: &Array1<f64>, data: &DataSet) -> Result<()> {
        if params.len() != self.nparams() {
            return Err(LmmcError::DimensionMismatch(format!(
                "model '{}' expects {} parameters, got {}",
                self.name,
                self.nparams(),
                params.len()
            )));
        }
        if data.nvars() != self.nvars() {
            return Err(LmmcError::DimensionMismatch(format!(
                "model '{}' expects {} independent variables, got {}",
                self.name,
                self.nvars(),
                data.nvars()
            )));
        }
        Ok(())
    }
}

impl ModelFunction for Model {
    fn evaluate(&self, vars: &[f64], params: &[f64]) -> f64 {
        (self.function)(vars, params)
    }

    fn parameter_count(&self) -> Option<usize> {
        Some(self.nparams())
    }

    fn variable_count(&self) -> Option<usize> {
        Some(self.nvars())
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("parameter_names", &self.parameter_names)
            .field("variable_names", &self.variable_names)
            .finish()
    }
}

/// `n` points of `nvars` independent variables each, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    values: Vec<f64>,
    n: usize,
    nvars: usize,
}

impl DataSet {
    /// Build a data set from one vector per independent variable.
    ///
    /// All columns must have the same, non-zero length.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let nvars = columns.len();
        if nvars == 0 {
            return Err(LmmcError::DimensionMismatch(
                "data set needs at least one independent variable".to_string(),
            ));
        }

        let n = columns[0].len();
        if n == 0 {
            return Err(LmmcError::DimensionMismatch(
                "data set needs at least one point".to_string(),
            ));
        }
        if let Some((j, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n) {
            return Err(LmmcError::DimensionMismatch(format!(
                "variable {} has {} values, expected {}",
                j,
                col.len(),
                n
            )));
        }

        let mut values = Vec::with_capacity(n * nvars);
        for i in 0..n {
            values.extend(columns.iter().map(|c| c[i]));
        }

        Ok(Self { values, n, nvars })
    }

    /// Build a single-variable data set.
    pub fn from_points(points: &[f64]) -> Result<Self> {
        Self::from_columns(&[points.to_vec()])
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Always false for a constructed data set.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Number of independent variables per point.
    pub fn nvars(&self) -> usize {
        self.nvars
    }

    /// The variable values of point `i`.
    pub fn point(&self, i: usize) -> &[f64] {
        &self.values[i * self.nvars..(i + 1) * self.nvars]
    }

    /// Iterate over the points in order.
    pub fn points(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.nvars)
    }

    /// Values of variable `j` across all points.
    pub fn column(&self, j: usize) -> Array1<f64> {
        self.points().map(|p| p[j]).collect()
    }

    /// Evaluate a model at every point.
    pub fn evaluate<M: ModelFunction + ?Sized>(&self, model: &M, params: &[f64]) -> Array1<f64> {
        self.points().map(|p| model.evaluate(p, params)).collect()
    }
}

/// Free (`true`) / fixed (`false`) flag per model parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMask {
    free: Vec<bool>,
}

impl ParameterMask {
    /// All `m` parameters free.
    pub fn all_free(m: usize) -> Self {
        Self { free: vec![true; m] }
    }

    /// Build a mask from explicit flags.
    pub fn from_flags(free: Vec<bool>) -> Self {
        Self { free }
    }

    /// Fix the named parameters, leaving all others free.
    pub fn from_fixed<S: AsRef<str>>(names: &[&str], fixed: &[S]) -> Result<Self> {
        let mut free = vec![true; names.len()];
        for name in fixed {
            let name = name.as_ref();
            let idx = names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| LmmcError::ParameterNotFound(name.to_string()))?;
            free[idx] = false;
        }
        Ok(Self { free })
    }

    /// Number of parameters covered by the mask.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// True when the mask covers no parameter.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Whether parameter `i` is fitted.
    pub fn is_free(&self, i: usize) -> bool {
        self.free[i]
    }

    /// Number of free parameters (`mfit`).
    pub fn free_count(&self) -> usize {
        self.free.iter().filter(|f| **f).count()
    }

    /// Indices of the free parameters, in model order.
    pub fn free_indices(&self) -> Vec<usize> {
        (0..self.free.len()).filter(|&i| self.free[i]).collect()
    }

}
