//! Termination states of a fit.

use serde::{Deserialize, Serialize};

/// How a Levenberg-Marquardt run terminated.
///
/// A singular curvature matrix is not a status: it is returned as
/// `LmmcError::SingularMatrix` and the fit produces no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitStatus {
    /// The chi-square improvement fell within the tolerance.
    Converged,

    /// The chi-square reached exactly zero.
    PerfectFit,

    /// The iteration cap was reached first.
    MaxIterations,
}

impl FitStatus {
    /// Returns true if the fit met a convergence criterion.
    pub fn is_converged(&self) -> bool {
        matches!(self, FitStatus::Converged | FitStatus::PerfectFit)
    }

    /// Returns a description of the status.
    pub fn description(&self) -> &'static str {
        match self {
            FitStatus::Converged => "Converged: chi-square change within tolerance",
            FitStatus::PerfectFit => "Converged: chi-square is zero",
            FitStatus::MaxIterations => "Terminated: maximum iterations reached",
        }
    }
}

/// Decide whether the iteration stops after a step.
///
/// `conv` is the chi-square decrease of the last candidate; a negative value
/// means the candidate was rejected and the iteration continues with more
/// damping.
pub fn check(
    chi_square: f64,
    conv: f64,
    tolerance: f64,
    iterations: usize,
    max_iterations: usize,
) -> Option<FitStatus> {
    if chi_square == 0.0 {
        Some(FitStatus::PerfectFit)
    } else if (0.0..=tolerance).contains(&conv) {
        Some(FitStatus::Converged)
    } else if iterations >= max_iterations {
        Some(FitStatus::MaxIterations)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        assert_eq!(check(0.0, -1.0, 1e-20, 1, 500), Some(FitStatus::PerfectFit));
        assert_eq!(check(2.0, 0.0, 1e-20, 3, 500), Some(FitStatus::Converged));
        assert_eq!(check(2.0, 1e-21, 1e-20, 3, 500), Some(FitStatus::Converged));
        assert_eq!(check(2.0, -1e-3, 1e-20, 3, 500), None);
        assert_eq!(check(2.0, 0.5, 1e-20, 3, 500), None);
        assert_eq!(check(2.0, 0.5, 1e-20, 500, 500), Some(FitStatus::MaxIterations));
        assert_eq!(check(2.0, f64::NAN, 1e-20, 3, 500), None);
    }

    #[test]
    fn test_status_flags() {
        assert!(FitStatus::Converged.is_converged());
        assert!(FitStatus::PerfectFit.is_converged());
        assert!(!FitStatus::MaxIterations.is_converged());
        assert!(FitStatus::MaxIterations.description().contains("maximum"));
    }
}
