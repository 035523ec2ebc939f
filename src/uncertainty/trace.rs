//! Per-repetition trace output.
//!
//! A [`TraceSink`] receives the noiseless response once and then every
//! repetition in index order. Sinks are only driven by serial runs.

use std::io::{BufWriter, Write};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lm::FitResult;

/// What happened to one repetition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RepetitionOutcome {
    /// The fit passed the outlier policy and entered the aggregates
    Accepted(FitResult),

    /// The fit completed but was discarded by the outlier policy
    Outlier(FitResult),

    /// The fitter hit a singular system
    Singular,
}

impl RepetitionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RepetitionOutcome::Accepted(_))
    }

    /// The fit, if one completed.
    pub fn fit(&self) -> Option<&FitResult> {
        match self {
            RepetitionOutcome::Accepted(fit) | RepetitionOutcome::Outlier(fit) => Some(fit),
            RepetitionOutcome::Singular => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RepetitionOutcome::Accepted(_) => "accepted",
            RepetitionOutcome::Outlier(_) => "discarded (outlier)",
            RepetitionOutcome::Singular => "discarded (singular matrix)",
        }
    }
}

/// One repetition as seen by a trace sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepetitionRecord {
    /// Zero-based repetition index
    pub index: usize,

    /// Noisy observations the fit was run against
    pub observed: Array1<f64>,

    pub outcome: RepetitionOutcome,
}

/// Receiver of trace records.
pub trait TraceSink {
    /// Called once with the noiseless model response.
    fn noiseless(&mut self, response: &Array1<f64>) -> Result<()>;

    /// Called after each repetition.
    fn repetition(&mut self, record: &RepetitionRecord) -> Result<()>;

    /// Called after the last repetition.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrace {
    pub noiseless: Option<Array1<f64>>,
    pub records: Vec<RepetitionRecord>,
}

impl MemoryTrace {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TraceSink for MemoryTrace {
    fn noiseless(&mut self, response: &Array1<f64>) -> Result<()> {
        self.noiseless = Some(response.clone());
        Ok(())
    }

    fn repetition(&mut self, record: &RepetitionRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Writes a human-readable trace to any writer.
pub struct WriterTrace<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> WriterTrace<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: BufWriter::new(writer),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        Ok(self.out.into_inner().map_err(|e| e.into_error())?)
    }
}

fn format_vector(v: &Array1<f64>) -> String {
    let items: Vec<String> = v.iter().map(|x| format!("{:.6e}", x)).collect();
    format!("[{}]", items.join(", "))
}

fn write_matrix<W: Write>(out: &mut W, m: &Array2<f64>) -> std::io::Result<()> {
    for row in m.rows() {
        let items: Vec<String> = row.iter().map(|x| format!("{:>14.6e}", x)).collect();
        writeln!(out, "  {}", items.join(" "))?;
    }
    Ok(())
}

impl<W: Write> TraceSink for WriterTrace<W> {
    fn noiseless(&mut self, response: &Array1<f64>) -> Result<()> {
        writeln!(self.out, "y = {}", format_vector(response))?;
        Ok(())
    }

    fn repetition(&mut self, record: &RepetitionRecord) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "- Sim. num. {}", record.index)?;
        writeln!(self.out, "yi = {}", format_vector(&record.observed))?;
        if let Some(fit) = record.outcome.fit() {
            writeln!(self.out, "- Number of iterations: {}", fit.iterations)?;
            writeln!(self.out, "- Parameters: {}", format_vector(&fit.params))?;
            writeln!(self.out, "- Chi2: {:.6e}", fit.chi_square)?;
            writeln!(self.out, "- Chi2 change in last iteration: {:.6e}", fit.delta)?;
            writeln!(self.out, "- Matrix of covariances:")?;
            write_matrix(&mut self.out, &fit.covariance)?;
        }
        writeln!(self.out, "- Outcome: {}", record.outcome.label())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
