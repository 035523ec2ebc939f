//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides a damped Gauss-Newton fitter for weighted nonlinear
//! least squares, with fixed parameters, finite difference Jacobians and a
//! Gauss-Jordan solver for the normal equations.

pub mod algorithm;
pub mod config;
pub mod convergence;
pub mod step;

// Re-export key types
pub use algorithm::{FitResult, LevenbergMarquardt};
pub use config::LmConfig;
pub use convergence::FitStatus;
