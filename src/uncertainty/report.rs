//! Final summary of a Monte Carlo run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Reliability estimate for one free parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub name: String,

    /// Position in the model's parameter list
    pub index: usize,

    /// Value used to synthesize the data
    pub truth: f64,

    /// Mean of the accepted estimates
    pub mean: f64,

    /// Mean squared deviation of the estimates from `truth`
    pub variance: f64,

    pub std_dev: f64,

    /// Coefficient of variation in percent; `None` when the mean is zero
    pub cv_percent: Option<f64>,
}

/// Outcome of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloReport {
    /// One entry per free parameter, in model order
    pub parameters: Vec<ParameterSummary>,

    /// Repetitions requested
    pub nsims: usize,

    /// Repetitions accepted
    pub success_count: usize,

    /// `success_count / nsims`, in `[0, 1]`
    pub success_rate: f64,

    pub singular: usize,
    pub outliers: usize,
    pub iteration_cap_hits: usize,

    /// Seed the per-repetition noise streams were derived from
    pub seed: u64,
}

impl MonteCarloReport {
    /// Summary of a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSummary> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for MonteCarloReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>16} {:>16} {:>10}",
            "Parameter", "Mean", "Standard Dev", "CV(%)"
        )?;
        writeln!(f, "{}", "-".repeat(57))?;
        for p in &self.parameters {
            let cv = match p.cv_percent {
                Some(cv) => format!("{:.4}", cv),
                None => "-".to_string(),
            };
            writeln!(
                f,
                "{:<12} {:>16.6e} {:>16.6e} {:>10}",
                p.name, p.mean, p.std_dev, cv
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Successful adjustments: {} of {} ({:.2}%)",
            self.success_count,
            self.nsims,
            100.0 * self.success_rate
        )?;
        write!(
            f,
            "Discarded: {} singular, {} outliers; {} fits hit the iteration cap",
            self.singular, self.outliers, self.iteration_cap_hits
        )
    }
}
