//! Per-iteration diagnostics reported by an iterative constraint solver.

use nalgebra::DVector;
use serde::Serialize;

/// Diagnostics of a single solver iteration.
///
/// Residual components are in engine-native units. `duration_us` is the time
/// elapsed since the start of the iteration loop, so it already includes every
/// earlier iteration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationSample {
    primal: DVector<f64>,
    dual: DVector<f64>,
    complementarity: DVector<f64>,
    optimality: DVector<f64>,
    duration_us: f64,
}

impl IterationSample {
    pub(crate) fn new(
        primal: DVector<f64>,
        dual: DVector<f64>,
        complementarity: DVector<f64>,
        optimality: DVector<f64>,
        duration_us: f64,
    ) -> Self {
        Self {
            primal,
            dual,
            complementarity,
            optimality,
            duration_us,
        }
    }

    /// Primal residual (constraint violation).
    pub fn primal(&self) -> &DVector<f64> {
        &self.primal
    }

    /// Dual residual.
    pub fn dual(&self) -> &DVector<f64> {
        &self.dual
    }

    /// Complementarity gap.
    pub fn complementarity(&self) -> &DVector<f64> {
        &self.complementarity
    }

    /// Optimality (KKT) gap.
    pub fn optimality(&self) -> &DVector<f64> {
        &self.optimality
    }

    /// Elapsed time in microseconds at the end of this iteration.
    pub fn duration_us(&self) -> f64 {
        self.duration_us
    }

    /// Shared length of the four diagnostic vectors.
    pub fn dimension(&self) -> usize {
        self.primal.len()
    }
}
