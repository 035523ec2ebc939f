//! Normal equations of a damped Gauss-Newton step.
//!
//! `α = JᵀWJ` with its diagonal scaled by `(1 + λ)` and `β = JᵀW(y − f)`,
//! where `W = diag(1/σ²)`.

use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::utils::gauss_jordan;

/// Build the damped curvature matrix `α` (`mfit × mfit`) and the gradient
/// `β` (`mfit × 1`).
pub fn curvature(
    jacobian: &Array2<f64>,
    residuals: &Array1<f64>,
    sigma: impl Fn(usize) -> f64,
    lambda: f64,
) -> (Array2<f64>, Array2<f64>) {
    let (n, mfit) = jacobian.dim();
    let mut alpha = Array2::zeros((mfit, mfit));
    let mut beta = Array2::zeros((mfit, 1));

    for k in 0..n {
        let s = sigma(k);
        let w = 1.0 / (s * s);
        for i in 0..mfit {
            let wi = jacobian[[k, i]] * w;
            for j in 0..=i {
                alpha[[i, j]] += wi * jacobian[[k, j]];
            }
            beta[[i, 0]] += wi * residuals[k];
        }
    }

    for i in 0..mfit {
        for j in 0..i {
            alpha[[j, i]] = alpha[[i, j]];
        }
        alpha[[i, i]] *= 1.0 + lambda;
    }

    (alpha, beta)
}

/// Solve `α·Δ = β` for the parameter increment.
pub fn increment(mut alpha: Array2<f64>, mut beta: Array2<f64>) -> Result<Array1<f64>> {
    gauss_jordan::solve(&mut alpha, &mut beta)?;
    Ok(beta.column(0).to_owned())
}
