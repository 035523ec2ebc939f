//! Numerical building blocks shared by the fitter.

pub mod finite_difference;
pub mod gauss_jordan;

pub use finite_difference::{derivative, jacobian};
pub use gauss_jordan::{invert, solve};
