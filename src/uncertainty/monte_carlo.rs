//! # Monte Carlo Reliability Estimation
//!
//! Synthesizes noiseless responses from known ("true") parameters, perturbs
//! them with Gaussian noise, refits every perturbed data set and aggregates
//! the accepted estimates into means, variances and coefficients of
//! variation.
//!
//! Each repetition draws its noise from its own stream. The stream seeds are
//! drawn up front with [`repetition_seeds`] from the run seed, so serial and
//! parallel runs with the same seed see identical noise and produce the same
//! counts.

use ndarray::Array1;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{LmmcError, Result};
use crate::lm::LevenbergMarquardt;
use crate::model::{DataSet, Model, ModelFunction, ParameterMask};
use crate::noise::{repetition_seeds, time_seed, NoiseGenerator, NoiseSource};
use crate::problem::{Deviations, FitProblem};

use super::config::MonteCarloConfig;
use super::report::MonteCarloReport;
use super::statistics::AggregateStatistics;
use super::trace::{RepetitionOutcome, RepetitionRecord, TraceSink};

/// Runs the noise-and-refit loop for one model and data layout.
///
/// # Example
///
/// ```
/// use lmmc_rs::models::enzyme;
/// use lmmc_rs::{DataSet, MonteCarloConfig, MonteCarloDriver};
/// use ndarray::array;
///
/// let data = DataSet::from_points(&[1.0, 2.0, 5.0, 10.0, 20.0]).unwrap();
/// let config = MonteCarloConfig::new(0.1).with_nsims(50).with_seed(7);
/// let driver = MonteCarloDriver::for_model(&enzyme::MICHAELIS, &data, array![10.0, 5.0], config).unwrap();
/// let report = driver.run().unwrap();
/// assert!(report.success_count > 0);
/// ```
#[derive(Debug, Clone)]
pub struct MonteCarloDriver<'a, M: ModelFunction + ?Sized> {
    model: &'a M,
    names: Vec<String>,
    data: &'a DataSet,
    truth: Array1<f64>,
    guess: Array1<f64>,
    mask: ParameterMask,
    config: MonteCarloConfig,
}

impl<'a> MonteCarloDriver<'a, Model> {
    /// Driver for a named model; parameter names come from the model.
    pub fn for_model(
        model: &'a Model,
        data: &'a DataSet,
        truth: Array1<f64>,
        config: MonteCarloConfig,
    ) -> Result<Self> {
        model.check(&truth, data)?;
        let names = model.parameter_names().iter().map(|s| s.to_string()).collect();
        Self::new(model, names, data, truth, config)
    }
}

impl<'a, M: ModelFunction + ?Sized> MonteCarloDriver<'a, M> {
    /// Create a driver. The initial guess defaults to the truth and every
    /// parameter starts free.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if `names`, `truth` and the model disagree
    /// * `InvalidConfiguration` if `config` does not validate
    pub fn new(
        model: &'a M,
        names: Vec<String>,
        data: &'a DataSet,
        truth: Array1<f64>,
        config: MonteCarloConfig,
    ) -> Result<Self> {
        config.validate()?;
        if names.len() != truth.len() {
            return Err(LmmcError::DimensionMismatch(format!(
                "{} parameter names for {} true values",
                names.len(),
                truth.len()
            )));
        }
        if let Some(expected) = model.parameter_count() {
            if expected != truth.len() {
                return Err(LmmcError::DimensionMismatch(format!(
                    "model expects {} parameters, got {}",
                    expected,
                    truth.len()
                )));
            }
        }
        if let Some(expected) = model.variable_count() {
            if expected != data.nvars() {
                return Err(LmmcError::DimensionMismatch(format!(
                    "model expects {} independent variables, data has {}",
                    expected,
                    data.nvars()
                )));
            }
        }

        let m = truth.len();
        Ok(Self {
            model,
            names,
            data,
            guess: truth.clone(),
            truth,
            mask: ParameterMask::all_free(m),
            config,
        })
    }

    /// Start every fit from `guess` instead of the truth.
    pub fn with_guess(mut self, guess: Array1<f64>) -> Result<Self> {
        if guess.len() != self.truth.len() {
            return Err(LmmcError::DimensionMismatch(format!(
                "guess has {} values, model has {} parameters",
                guess.len(),
                self.truth.len()
            )));
        }
        self.guess = guess;
        Ok(self)
    }

    /// Choose which parameters are adjusted.
    pub fn with_mask(mut self, mask: ParameterMask) -> Result<Self> {
        if mask.len() != self.truth.len() {
            return Err(LmmcError::DimensionMismatch(format!(
                "mask covers {} parameters, model has {}",
                mask.len(),
                self.truth.len()
            )));
        }
        if mask.free_count() == 0 {
            return Err(LmmcError::InvalidConfiguration(
                "at least one parameter must be free".to_string(),
            ));
        }
        self.mask = mask;
        Ok(self)
    }

    /// Hold the named parameters at their guess values.
    pub fn with_fixed<S: AsRef<str>>(self, fixed: &[S]) -> Result<Self> {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        let mask = ParameterMask::from_fixed(&names, fixed)?;
        self.with_mask(mask)
    }

    pub fn with_config(mut self, config: MonteCarloConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    pub fn truth(&self) -> &Array1<f64> {
        &self.truth
    }

    pub fn guess(&self) -> &Array1<f64> {
        &self.guess
    }

    pub fn mask(&self) -> &ParameterMask {
        &self.mask
    }

    /// Model response at the true parameters.
    pub fn noiseless_response(&self) -> Array1<f64> {
        self.data.evaluate(self.model, &self.truth.to_vec())
    }

    /// Run the configured number of repetitions with the default noise
    /// stream, serially or on the rayon pool depending on the config.
    ///
    /// # Errors
    ///
    /// `NoSuccessfulFits` when every repetition was discarded.
    pub fn run(&self) -> Result<MonteCarloReport>
    where
        M: Sync,
    {
        self.run_with_noise(NoiseGenerator::seeded)
    }

    /// Like [`run`](Self::run) with a custom noise stream per repetition;
    /// `make_noise` receives the repetition's derived seed.
    pub fn run_with_noise<N, F>(&self, make_noise: F) -> Result<MonteCarloReport>
    where
        M: Sync,
        N: NoiseSource,
        F: Fn(u64) -> N + Sync,
    {
        let seed = self.run_seed();
        let stats = if self.config.parallel {
            self.aggregate_parallel(seed, &make_noise)?
        } else {
            self.aggregate_serial(seed, &make_noise, None)?
        };
        self.finish(&stats, seed)
    }

    /// Serial run that reports every repetition to `sink`.
    pub fn run_traced<T: TraceSink>(&self, sink: &mut T) -> Result<MonteCarloReport> {
        let seed = self.run_seed();
        let sink: &mut dyn TraceSink = sink;
        let stats = self.aggregate_serial(seed, &NoiseGenerator::seeded, Some(sink))?;
        self.finish(&stats, seed)
    }

    fn run_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(time_seed)
    }

    fn aggregate_serial<N, F>(
        &self,
        seed: u64,
        make_noise: &F,
        mut sink: Option<&mut dyn TraceSink>,
    ) -> Result<AggregateStatistics>
    where
        N: NoiseSource,
        F: Fn(u64) -> N,
    {
        let nsims = self.config.nsims;
        let free = self.mask.free_indices();
        let lm = LevenbergMarquardt::with_config(self.config.lm.clone());
        let response = self.noiseless_response();

        info!(
            nsims,
            noise_sd = self.config.noise_sd,
            seed,
            free = free.len(),
            "starting Monte Carlo run"
        );

        if let Some(sink) = sink.as_mut() {
            sink.noiseless(&response)?;
        }

        let progress_step = (nsims / 10).max(1);
        let mut stats = AggregateStatistics::new(&self.truth, &free);
        for (index, stream_seed) in repetition_seeds(seed, nsims).into_iter().enumerate() {
            let mut noise = make_noise(stream_seed);
            let (observed, outcome) = self.repetition(&lm, &response, &free, &mut noise)?;
            stats.record(&outcome);

            if let Some(sink) = sink.as_mut() {
                sink.repetition(&RepetitionRecord {
                    index,
                    observed,
                    outcome,
                })?;
            }

            if (index + 1) % progress_step == 0 {
                debug!(
                    done = index + 1,
                    nsims,
                    accepted = stats.success_count,
                    "Monte Carlo progress"
                );
            }
        }

        if let Some(sink) = sink.as_mut() {
            sink.finish()?;
        }
        Ok(stats)
    }

    fn aggregate_parallel<N, F>(&self, seed: u64, make_noise: &F) -> Result<AggregateStatistics>
    where
        M: Sync,
        N: NoiseSource,
        F: Fn(u64) -> N + Sync,
    {
        let nsims = self.config.nsims;
        let free = self.mask.free_indices();
        let lm = LevenbergMarquardt::with_config(self.config.lm.clone());
        let response = self.noiseless_response();

        info!(
            nsims,
            noise_sd = self.config.noise_sd,
            seed,
            free = free.len(),
            threads = rayon::current_num_threads(),
            "starting parallel Monte Carlo run"
        );

        let seeds = repetition_seeds(seed, nsims);
        seeds
            .par_iter()
            .try_fold(
                || AggregateStatistics::new(&self.truth, &free),
                |mut stats, &stream_seed| -> Result<AggregateStatistics> {
                    let mut noise = make_noise(stream_seed);
                    let (_, outcome) = self.repetition(&lm, &response, &free, &mut noise)?;
                    stats.record(&outcome);
                    Ok(stats)
                },
            )
            .try_reduce(
                || AggregateStatistics::new(&self.truth, &free),
                |a, b| Ok(a.merge(b)),
            )
    }

    /// Perturb the response, refit and classify the result.
    fn repetition<N: NoiseSource>(
        &self,
        lm: &LevenbergMarquardt,
        response: &Array1<f64>,
        free: &[usize],
        noise: &mut N,
    ) -> Result<(Array1<f64>, RepetitionOutcome)> {
        let sd = self.config.noise_sd;
        let observed = response.mapv(|y| y + sd * noise.next_deviate());

        let problem = FitProblem::new(self.model, self.data, &observed)?
            .with_deviations(Deviations::Uniform(sd))?;

        let outcome = match lm.fit(&problem, &self.guess, &self.mask) {
            Ok(fit) => match self.config.outliers.check(&fit, &self.truth, free) {
                None => RepetitionOutcome::Accepted(fit),
                Some(reason) => {
                    debug!(?reason, "repetition discarded");
                    RepetitionOutcome::Outlier(fit)
                }
            },
            Err(LmmcError::SingularMatrix) => RepetitionOutcome::Singular,
            Err(e) => return Err(e),
        };

        Ok((observed, outcome))
    }

    fn finish(&self, stats: &AggregateStatistics, seed: u64) -> Result<MonteCarloReport> {
        match stats.finalize(&self.names, self.config.nsims, seed) {
            Ok(report) => {
                info!(
                    accepted = report.success_count,
                    nsims = report.nsims,
                    singular = report.singular,
                    outliers = report.outliers,
                    iteration_cap_hits = report.iteration_cap_hits,
                    "Monte Carlo run finished"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(nsims = self.config.nsims, "no repetition produced an acceptable fit");
                Err(e)
            }
        }
    }
}
