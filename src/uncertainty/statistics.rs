//! Running aggregates over Monte Carlo repetitions.
//!
//! Accepted fits contribute their free parameter values; the second moment
//! is taken about the ground truth, so the reported variance is the mean
//! squared error of the estimator rather than its sample variance.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{LmmcError, Result};
use crate::lm::FitStatus;

use super::report::{MonteCarloReport, ParameterSummary};
use super::trace::RepetitionOutcome;

/// Sums and counters collected while repetitions run.
///
/// Partial aggregates from different workers combine with [`merge`](Self::merge);
/// the result does not depend on how repetitions were split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    /// Free parameter indices, in model order
    free: Vec<usize>,

    /// Ground-truth values of the free parameters
    truth: Vec<f64>,

    /// Sum of accepted estimates per free parameter
    sums: Vec<f64>,

    /// Sum of squared deviations from the truth per free parameter
    sum_sq_dev: Vec<f64>,

    /// Repetitions recorded
    pub attempted: usize,

    /// Accepted repetitions
    pub success_count: usize,

    /// Repetitions where the fitter hit a singular system
    pub singular: usize,

    /// Repetitions discarded by the outlier policy
    pub outliers: usize,

    /// Completed fits that stopped at the iteration cap
    pub iteration_cap_hits: usize,
}

impl AggregateStatistics {
    /// Empty aggregate for the given free parameters.
    pub fn new(truth: &Array1<f64>, free: &[usize]) -> Self {
        let mfit = free.len();
        Self {
            free: free.to_vec(),
            truth: free.iter().map(|&i| truth[i]).collect(),
            sums: vec![0.0; mfit],
            sum_sq_dev: vec![0.0; mfit],
            attempted: 0,
            success_count: 0,
            singular: 0,
            outliers: 0,
            iteration_cap_hits: 0,
        }
    }

    /// Record one repetition.
    pub fn record(&mut self, outcome: &RepetitionOutcome) {
        self.attempted += 1;
        match outcome {
            RepetitionOutcome::Accepted(fit) => {
                self.success_count += 1;
                for (j, &index) in self.free.iter().enumerate() {
                    let value = fit.params[index];
                    self.sums[j] += value;
                    self.sum_sq_dev[j] += (value - self.truth[j]).powi(2);
                }
                if fit.status == FitStatus::MaxIterations {
                    self.iteration_cap_hits += 1;
                }
            }
            RepetitionOutcome::Outlier(fit) => {
                self.outliers += 1;
                if fit.status == FitStatus::MaxIterations {
                    self.iteration_cap_hits += 1;
                }
            }
            RepetitionOutcome::Singular => self.singular += 1,
        }
    }

    /// Combine two partial aggregates over the same parameters.
    pub fn merge(mut self, other: Self) -> Self {
        for j in 0..self.sums.len() {
            self.sums[j] += other.sums[j];
            self.sum_sq_dev[j] += other.sum_sq_dev[j];
        }
        self.attempted += other.attempted;
        self.success_count += other.success_count;
        self.singular += other.singular;
        self.outliers += other.outliers;
        self.iteration_cap_hits += other.iteration_cap_hits;
        self
    }

    /// Mean of the accepted estimates per free parameter.
    pub fn means(&self) -> Option<Vec<f64>> {
        if self.success_count == 0 {
            return None;
        }
        let k = self.success_count as f64;
        Some(self.sums.iter().map(|s| s / k).collect())
    }

    /// Mean squared deviation from the truth per free parameter.
    pub fn variances(&self) -> Option<Vec<f64>> {
        if self.success_count == 0 {
            return None;
        }
        let k = self.success_count as f64;
        Some(self.sum_sq_dev.iter().map(|s| s / k).collect())
    }

    /// Turn the aggregate into a report.
    ///
    /// `names` holds every model parameter name; only the free ones appear in
    /// the report.
    ///
    /// # Errors
    ///
    /// `NoSuccessfulFits` when no repetition was accepted.
    pub fn finalize(&self, names: &[String], nsims: usize, seed: u64) -> Result<MonteCarloReport> {
        let (means, variances) = match (self.means(), self.variances()) {
            (Some(m), Some(v)) => (m, v),
            _ => {
                return Err(LmmcError::NoSuccessfulFits {
                    attempted: self.attempted,
                })
            }
        };

        let parameters = self
            .free
            .iter()
            .enumerate()
            .map(|(j, &index)| {
                let mean = means[j];
                let variance = variances[j];
                let std_dev = variance.sqrt();
                ParameterSummary {
                    name: names
                        .get(index)
                        .cloned()
                        .unwrap_or_else(|| format!("p{}", index)),
                    index,
                    truth: self.truth[j],
                    mean,
                    variance,
                    std_dev,
                    cv_percent: if mean != 0.0 {
                        Some(100.0 * std_dev / mean.abs())
                    } else {
                        None
                    },
                }
            })
            .collect();

        Ok(MonteCarloReport {
            parameters,
            nsims,
            success_count: self.success_count,
            success_rate: self.success_count as f64 / nsims as f64,
            singular: self.singular,
            outliers: self.outliers,
            iteration_cap_hits: self.iteration_cap_hits,
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lm::FitResult;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn accepted(params: Array1<f64>) -> RepetitionOutcome {
        RepetitionOutcome::Accepted(FitResult {
            params,
            covariance: Array2::eye(2),
            chi_square: 1.0,
            delta: 0.0,
            iterations: 4,
            status: FitStatus::Converged,
        })
    }

    fn names() -> Vec<String> {
        vec!["Vmax".to_string(), "Km".to_string()]
    }

    #[test]
    fn test_moments_about_truth() {
        let truth = array![10.0, 5.0];
        let mut stats = AggregateStatistics::new(&truth, &[0, 1]);
        stats.record(&accepted(array![11.0, 5.0]));
        stats.record(&accepted(array![9.0, 6.0]));
        stats.record(&RepetitionOutcome::Singular);

        assert_eq!(stats.attempted, 3);
        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.singular, 1);

        let report = stats.finalize(&names(), 3, 1).unwrap();
        let vmax = &report.parameters[0];
        assert_relative_eq!(vmax.mean, 10.0);
        // ((11-10)² + (9-10)²) / 2
        assert_relative_eq!(vmax.variance, 1.0);
        assert_relative_eq!(vmax.cv_percent.unwrap(), 10.0);

        let km = &report.parameters[1];
        assert_relative_eq!(km.mean, 5.5);
        assert_relative_eq!(km.variance, 0.5);
        assert_relative_eq!(report.success_rate, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_merge_matches_sequential() {
        let truth = array![10.0, 5.0];
        let fits = [
            array![10.5, 4.9],
            array![9.7, 5.2],
            array![10.1, 5.05],
            array![9.9, 4.8],
        ];

        let mut whole = AggregateStatistics::new(&truth, &[0, 1]);
        let mut left = AggregateStatistics::new(&truth, &[0, 1]);
        let mut right = AggregateStatistics::new(&truth, &[0, 1]);
        for (i, p) in fits.iter().enumerate() {
            let outcome = accepted(p.clone());
            whole.record(&outcome);
            if i < 2 {
                left.record(&outcome);
            } else {
                right.record(&outcome);
            }
        }

        let merged = left.merge(right);
        assert_eq!(merged.success_count, whole.success_count);
        let (a, b) = (merged.means().unwrap(), whole.means().unwrap());
        for j in 0..2 {
            assert_relative_eq!(a[j], b[j], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fixed_parameters_are_not_reported() {
        let truth = array![10.0, 5.0];
        let mut stats = AggregateStatistics::new(&truth, &[1]);
        stats.record(&accepted(array![10.0, 5.5]));

        let report = stats.finalize(&names(), 1, 0).unwrap();
        assert_eq!(report.parameters.len(), 1);
        assert_eq!(report.parameters[0].name, "Km");
        assert_relative_eq!(report.parameters[0].variance, 0.25);
    }

    #[test]
    fn test_zero_mean_has_no_cv() {
        let truth = array![0.0, 5.0];
        let mut stats = AggregateStatistics::new(&truth, &[0]);
        stats.record(&accepted(array![0.0, 5.0]));
        let report = stats.finalize(&names(), 1, 0).unwrap();
        assert_eq!(report.parameters[0].cv_percent, None);
    }

    #[test]
    fn test_no_successes() {
        let truth = array![10.0, 5.0];
        let mut stats = AggregateStatistics::new(&truth, &[0, 1]);
        stats.record(&RepetitionOutcome::Singular);
        stats.record(&RepetitionOutcome::Singular);

        assert!(stats.means().is_none());
        assert!(matches!(
            stats.finalize(&names(), 2, 0),
            Err(LmmcError::NoSuccessfulFits { attempted: 2 })
        ));
    }
}
