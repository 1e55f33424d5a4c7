//! Solver run descriptors handed out to the external engine.

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Family of iterative constraint solver being benchmarked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    /// Projected Gauss-Seidel (`SequentialSolver`).
    Sequential,
    /// Quadratic program solver, optionally reduced through a Schur complement.
    Qp,
}

/// Immutable configuration of one iterative solver over its whole lifetime.
///
/// Deserialization goes through [`SolverRunBuilder::build`], so a loaded run
/// is validated exactly like a constructed one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SolverRunBuilder")]
pub struct SolverRun {
    name: String,
    kind: SolverKind,
    max_iterations: usize,
    precision: f64,
    uses_schur_complement: bool,
}

impl SolverRun {
    /// Creates a validated run description.
    pub fn new<S: Into<String>>(
        name: S,
        kind: SolverKind,
        max_iterations: usize,
        precision: f64,
        uses_schur_complement: bool,
    ) -> Result<Self> {
        SolverRunBuilder::new(name, kind)
            .max_iterations(max_iterations)
            .precision(precision)
            .schur_complement(uses_schur_complement)
            .build()
    }

    /// Starts a builder with the default iteration budget and precision.
    pub fn builder<S: Into<String>>(name: S, kind: SolverKind) -> SolverRunBuilder {
        SolverRunBuilder::new(name, kind)
    }

    /// Label used in reports and plot legends.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Solver family, PGS or QP.
    pub fn kind(&self) -> SolverKind {
        self.kind
    }

    /// Upper bound on solver iterations per timestep.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Residual threshold below which the solver stops iterating.
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Whether the solver works on the Schur complement of the KKT system.
    pub fn uses_schur_complement(&self) -> bool {
        self.uses_schur_complement
    }
}

/// Builder that validates parameters before constructing a [`SolverRun`].
#[derive(Debug, Deserialize)]
pub struct SolverRunBuilder {
    name: String,
    kind: SolverKind,
    #[serde(default = "default_max_iterations")]
    max_iterations: usize,
    #[serde(default = "default_precision")]
    precision: f64,
    #[serde(default)]
    uses_schur_complement: bool,
}

fn default_max_iterations() -> usize {
    200
}

fn default_precision() -> f64 {
    1e-8
}

impl SolverRunBuilder {
    /// Start building a run; defaults to 200 iterations at precision `1e-8`.
    pub fn new<S: Into<String>>(name: S, kind: SolverKind) -> Self {
        Self {
            name: name.into(),
            kind,
            max_iterations: default_max_iterations(),
            precision: default_precision(),
            uses_schur_complement: false,
        }
    }

    /// Sets the iteration budget per timestep.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the residual threshold that ends the iteration loop.
    pub fn precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Marks the solver as working on the Schur complement of the KKT system.
    pub fn schur_complement(mut self, enabled: bool) -> Self {
        self.uses_schur_complement = enabled;
        self
    }

    /// Finalizes construction after validating the iteration budget and precision.
    pub fn build(self) -> Result<SolverRun> {
        if self.max_iterations == 0 {
            return Err(BenchError::invalid_parameter("max_iterations", 0.0));
        }
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(BenchError::invalid_parameter("precision", self.precision));
        }

        Ok(SolverRun {
            name: self.name,
            kind: self.kind,
            max_iterations: self.max_iterations,
            precision: self.precision,
            uses_schur_complement: self.uses_schur_complement,
        })
    }
}

impl TryFrom<SolverRunBuilder> for SolverRun {
    type Error = BenchError;

    fn try_from(builder: SolverRunBuilder) -> Result<Self> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let run = SolverRun::builder("pgs", SolverKind::Sequential)
            .build()
            .unwrap();
        assert_eq!(run.name(), "pgs");
        assert_eq!(run.max_iterations(), 200);
        assert_eq!(run.precision(), 1e-8);
        assert!(!run.uses_schur_complement());
    }

    #[test]
    fn builder_rejects_zero_iterations_and_bad_precision() {
        let zero = SolverRun::new("qp", SolverKind::Qp, 0, 1e-8, true);
        assert!(matches!(
            zero,
            Err(BenchError::InvalidParameter {
                parameter: "max_iterations",
                ..
            })
        ));

        let negative = SolverRun::new("qp", SolverKind::Qp, 10, -1.0, true);
        assert!(matches!(
            negative,
            Err(BenchError::InvalidParameter {
                parameter: "precision",
                ..
            })
        ));
        assert!(SolverRun::new("qp", SolverKind::Qp, 10, f64::NAN, true).is_err());
    }

    #[test]
    fn deserialization_is_validated() {
        let bad = r#"{"name":"qp","kind":"Qp","max_iterations":0,"precision":-1.0,"uses_schur_complement":true}"#;
        let err = serde_json::from_str::<SolverRun>(bad).unwrap_err();
        assert!(err.to_string().contains("max_iterations"));

        let negative_precision = r#"{"name":"qp","kind":"Qp","max_iterations":10,"precision":-1.0}"#;
        assert!(serde_json::from_str::<SolverRun>(negative_precision).is_err());

        let minimal: SolverRun =
            serde_json::from_str(r#"{"name":"bench-pgs","kind":"Sequential"}"#).unwrap();
        assert_eq!(minimal.max_iterations(), 200);
        assert_eq!(minimal.precision(), 1e-8);

        let run = SolverRun::new("bench-qp", SolverKind::Qp, 50, 1e-6, true).unwrap();
        let json = serde_json::to_string(&run).unwrap();
        assert_eq!(serde_json::from_str::<SolverRun>(&json).unwrap(), run);
    }
}
