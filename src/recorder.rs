//! Step-scoped accumulation of solver diagnostics.
//!
//! The external engine drives a [`ConvergenceRecorder`] through the
//! [`BenchmarkSink`] capability: one `begin_step` per timestep, one
//! `record_factorization` after the system matrix is factored, one
//! `push_iteration` per solver iteration and a closing `end_step`. The
//! recorder performs no numeric work of its own.

use std::fmt;

use log::{debug, trace, warn};
use nalgebra::DVector;
use serde::Serialize;

use crate::error::{BenchError, Result};
use crate::sample::IterationSample;

/// Lifecycle of a recorder across simulation timesteps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RecorderState {
    /// No step has been opened yet.
    Idle,
    /// A step is open and accepts diagnostics.
    StepOpen,
    /// The last step was finalized; samples are ready for reporting.
    StepClosed,
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecorderState::Idle => "idle",
            RecorderState::StepOpen => "inside an open step",
            RecorderState::StepClosed => "closed",
        };
        f.write_str(label)
    }
}

/// Capability implemented by anything an engine-side solver adapter can feed.
pub trait BenchmarkSink {
    /// Opens a new timestep, discarding the previous step's data.
    fn begin_step(&mut self) -> Result<()>;

    /// Stores the one-time factorization cost of the current step.
    fn record_factorization(&mut self, duration_us: f64) -> Result<()>;

    /// Appends the diagnostics of one solver iteration.
    fn push_iteration(
        &mut self,
        primal: DVector<f64>,
        dual: DVector<f64>,
        complementarity: DVector<f64>,
        optimality: DVector<f64>,
        duration_us: f64,
    ) -> Result<()>;

    /// Finalizes the current timestep.
    fn end_step(&mut self) -> Result<()>;
}

/// Ordered per-iteration samples of the current timestep.
#[derive(Clone, Debug, Serialize)]
pub struct ConvergenceRecorder {
    state: RecorderState,
    samples: Vec<IterationSample>,
    factor_us: f64,
    dimension: Option<usize>,
}

impl Default for ConvergenceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvergenceRecorder {
    /// Creates an idle recorder with no samples.
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            samples: Vec::new(),
            factor_us: 0.0,
            dimension: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Whether a step is open and accepting diagnostics.
    pub fn is_step_open(&self) -> bool {
        self.state == RecorderState::StepOpen
    }

    /// Samples in iteration order.
    pub fn samples(&self) -> &[IterationSample] {
        &self.samples
    }

    /// Number of iterations recorded in the current step.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the current step holds no iterations.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drops all data and returns to [`RecorderState::Idle`], even from an open step.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.factor_us = 0.0;
        self.dimension = None;
        self.state = RecorderState::Idle;
        debug!("recorder reset");
    }

    /// Factorization cost of the current step in microseconds.
    pub fn factor_us(&self) -> f64 {
        self.factor_us
    }

    /// Diagnostic vector length fixed by the step's first sample.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Opens a step and returns a writer that closes it when finished or dropped.
    pub fn step(&mut self) -> Result<StepWriter<'_>> {
        self.begin_step()?;
        Ok(StepWriter { recorder: self })
    }

    fn require_open(&self, operation: &'static str) -> Result<()> {
        if self.state != RecorderState::StepOpen {
            return Err(BenchError::invalid_state(operation, self.state));
        }
        Ok(())
    }
}

impl BenchmarkSink for ConvergenceRecorder {
    fn begin_step(&mut self) -> Result<()> {
        if self.state == RecorderState::StepOpen {
            return Err(BenchError::invalid_state("begin_step", self.state));
        }
        self.samples.clear();
        self.factor_us = 0.0;
        self.dimension = None;
        self.state = RecorderState::StepOpen;
        debug!("recorder step opened");
        Ok(())
    }

    fn record_factorization(&mut self, duration_us: f64) -> Result<()> {
        self.require_open("record_factorization")?;
        self.factor_us = duration_us;
        trace!("factorization took {duration_us} us");
        Ok(())
    }

    fn push_iteration(
        &mut self,
        primal: DVector<f64>,
        dual: DVector<f64>,
        complementarity: DVector<f64>,
        optimality: DVector<f64>,
        duration_us: f64,
    ) -> Result<()> {
        self.require_open("push_iteration")?;

        let found = primal.len();
        for (context, len) in [
            ("dual residual length", dual.len()),
            ("complementarity gap length", complementarity.len()),
            ("optimality gap length", optimality.len()),
        ] {
            if len != found {
                warn!("rejected iteration {}: {context} {len} != {found}", self.len());
                return Err(BenchError::dimension_mismatch(context, found, len));
            }
        }
        if found == 0 {
            warn!("rejected iteration {}: empty diagnostics", self.len());
            return Err(BenchError::dimension_mismatch("diagnostic vector length", 1, 0));
        }
        if let Some(expected) = self.dimension {
            if expected != found {
                warn!(
                    "rejected iteration {}: dimension {found} differs from step dimension {expected}",
                    self.len()
                );
                return Err(BenchError::dimension_mismatch(
                    "step dimension",
                    expected,
                    found,
                ));
            }
        }

        self.dimension = Some(found);
        trace!(
            "iteration {} recorded at {duration_us} us (primal[0] = {})",
            self.len(),
            primal[0]
        );
        self.samples.push(IterationSample::new(
            primal,
            dual,
            complementarity,
            optimality,
            duration_us,
        ));
        Ok(())
    }

    fn end_step(&mut self) -> Result<()> {
        self.require_open("end_step")?;
        self.state = RecorderState::StepClosed;
        debug!(
            "recorder step closed with {} iterations, factor {} us",
            self.samples.len(),
            self.factor_us
        );
        Ok(())
    }
}

/// Exclusive write window over one recorder step.
#[derive(Debug)]
pub struct StepWriter<'a> {
    recorder: &'a mut ConvergenceRecorder,
}

impl StepWriter<'_> {
    /// Stores the factorization cost of this step.
    pub fn record_factorization(&mut self, duration_us: f64) -> Result<()> {
        self.recorder.record_factorization(duration_us)
    }

    /// Appends one iteration to this step.
    pub fn push_iteration(
        &mut self,
        primal: DVector<f64>,
        dual: DVector<f64>,
        complementarity: DVector<f64>,
        optimality: DVector<f64>,
        duration_us: f64,
    ) -> Result<()> {
        self.recorder
            .push_iteration(primal, dual, complementarity, optimality, duration_us)
    }

    /// Number of samples pushed so far in this step.
    pub fn len(&self) -> usize {
        self.recorder.len()
    }

    /// Whether nothing was pushed in this step yet.
    pub fn is_empty(&self) -> bool {
        self.recorder.is_empty()
    }

    /// Closes the step explicitly.
    pub fn finish(self) -> Result<()> {
        self.recorder.end_step()
    }
}

impl Drop for StepWriter<'_> {
    fn drop(&mut self) {
        if self.recorder.is_step_open() {
            // Only fails when the step is already closed, which was just checked.
            let _ = self.recorder.end_step();
        }
    }
}
