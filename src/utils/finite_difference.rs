//! Finite difference methods for numerical differentiation.
//!
//! This module provides the central-difference estimate of a model's partial
//! derivative with respect to one parameter, and the Jacobian built from it.

use ndarray::Array2;

use crate::model::{DataSet, ModelFunction};

/// Default step size for finite differences.
pub const DEFAULT_STEP: f64 = 1e-4;

/// Compute `∂f/∂params[k]` at `point` using central differences.
///
/// `params[k]` is perturbed by `±step` in place and restored before
/// returning, so the caller can reuse one scratch buffer for every
/// derivative of an iteration.
///
/// # Arguments
///
/// * `model` - The model to differentiate
/// * `point` - The independent-variable values
/// * `params` - Full parameter vector in model order
/// * `k` - Index of the parameter to differentiate against
/// * `step` - The finite difference step `h`
pub fn derivative<M: ModelFunction + ?Sized>(
    model: &M,
    point: &[f64],
    params: &mut [f64],
    k: usize,
    step: f64,
) -> f64 {
    let backup = params[k];

    params[k] = backup + step;
    let forward = model.evaluate(point, params);

    params[k] = backup - step;
    let backward = model.evaluate(point, params);

    params[k] = backup;
    (forward - backward) / (2.0 * step)
}

/// Compute the Jacobian of the model response over a data set.
///
/// Row `i` holds the derivatives at point `i`; column `j` is the derivative
/// with respect to parameter `columns[j]`.
///
/// # Returns
///
/// * An `n × columns.len()` matrix
pub fn jacobian<M: ModelFunction + ?Sized>(
    model: &M,
    data: &DataSet,
    params: &mut [f64],
    columns: &[usize],
    step: f64,
) -> Array2<f64> {
    let mut jac = Array2::zeros((data.len(), columns.len()));

    for (i, point) in data.points().enumerate() {
        for (j, &k) in columns.iter().enumerate() {
            jac[[i, j]] = derivative(model, point, params, k, step);
        }
    }

    jac
}
