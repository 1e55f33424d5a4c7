//! Configuration for reports and for the default benchmark suite.

use serde::{Deserialize, Serialize};

use crate::report::AxisScale;

/// Controls how the [`ReportFormatter`](crate::ReportFormatter) renders its output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Scale of the shared residual axis of convergence plots.
    pub y_scale: AxisScale,
    /// Fixed number of decimals in summaries; `None` keeps the shortest exact form.
    pub precision: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            y_scale: AxisScale::Log,
            precision: None,
        }
    }
}

impl ReportOptions {
    /// Override the residual axis scale.
    pub fn with_y_scale(mut self, y_scale: AxisScale) -> Self {
        self.y_scale = y_scale;
        self
    }

    /// Print every number in summaries with `decimals` digits after the point.
    pub fn with_precision(mut self, decimals: usize) -> Self {
        self.precision = Some(decimals);
        self
    }
}

/// Parameters of the PGS versus QP comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuiteOptions {
    /// Simulation timestep in seconds.
    pub timestep: f64,
    /// Iteration budget shared by both solvers.
    pub iterations: usize,
    /// Convergence threshold shared by both solvers.
    pub precision: f64,
    /// Whether the QP solver works on the Schur complement.
    pub schur: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            timestep: 0.005,
            iterations: 200,
            precision: 1e-8,
            schur: true,
        }
    }
}

impl SuiteOptions {
    /// Set the simulation timestep in seconds.
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the iteration budget of both solvers.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the convergence threshold of both solvers.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Enable or disable the Schur complement reduction on the QP side.
    pub fn with_schur(mut self, schur: bool) -> Self {
        self.schur = schur;
        self
    }
}
