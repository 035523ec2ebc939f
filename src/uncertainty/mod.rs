//! # Monte Carlo Reliability
//!
//! Estimates how reliably a model's parameters can be recovered from data
//! with a given noise level. A run synthesizes the noiseless response at the
//! true parameters, perturbs it repeatedly, refits each perturbed data set
//! and aggregates the accepted fits:
//!
//! - [`MonteCarloConfig`] and [`OutlierPolicy`] configure a run
//! - [`MonteCarloDriver`] runs repetitions serially or on the rayon pool
//! - [`AggregateStatistics`] collects the running sums
//! - [`MonteCarloReport`] holds means, standard deviations and CV(%)
//! - [`TraceSink`] receives every repetition of a serial run

mod config;
mod monte_carlo;
mod report;
mod statistics;
mod trace;

pub use config::{MonteCarloConfig, OutlierPolicy, Rejection};
pub use monte_carlo::MonteCarloDriver;
pub use report::{MonteCarloReport, ParameterSummary};
pub use statistics::AggregateStatistics;
pub use trace::{MemoryTrace, RepetitionOutcome, RepetitionRecord, TraceSink, WriterTrace};
