//! # lmmc-rs
//!
//! `lmmc-rs` estimates the reliability of nonlinear least-squares parameter
//! estimates by Monte Carlo simulation. Synthetic data generated from known
//! parameters is perturbed with Gaussian noise and refitted with a
//! Levenberg-Marquardt fitter; the spread of the refitted parameters measures
//! how well the experiment determines them.
//!
//! The library provides:
//! - A Levenberg-Marquardt fitter with fixed parameters and finite difference
//!   Jacobians
//! - A Gauss-Jordan solver with full pivoting
//! - Reproducible Gaussian noise streams
//! - A registry of enzyme kinetics models
//! - A Monte Carlo driver with outlier rejection and parallel execution
//!
//! ## Basic Usage
//!
//! ```
//! use lmmc_rs::{DataSet, MonteCarloConfig, MonteCarloDriver, ModelRegistry};
//! use ndarray::array;
//!
//! let model = ModelRegistry::builtin().lookup("michaelis").unwrap();
//! let data = DataSet::from_points(&[1.0, 2.0, 5.0, 10.0, 20.0]).unwrap();
//! let config = MonteCarloConfig::new(0.05).with_nsims(100).with_seed(1);
//!
//! let report = MonteCarloDriver::for_model(model, &data, array![10.0, 5.0], config)
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! println!("{}", report);
//! ```

// Public modules
pub mod error;
pub mod lm;
pub mod model;
pub mod models;
pub mod noise;
pub mod problem;
pub mod uncertainty;
pub mod utils;

// Re-exports for convenience
pub use error::{LmmcError, Result};
pub use lm::{FitResult, FitStatus, LevenbergMarquardt, LmConfig};
pub use model::{DataSet, Model, ModelFunction, ParameterMask};
pub use models::ModelRegistry;
pub use noise::{NoiseGenerator, NoiseSource};
pub use problem::{Deviations, FitProblem};
pub use uncertainty::{MonteCarloConfig, MonteCarloDriver, MonteCarloReport, OutlierPolicy};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
