//! Stand-in solver that drives a [`BenchmarkSink`] the way the physics engine does.
//!
//! Residuals decay geometrically from `initial_residual` by `contraction_rate`
//! per iteration, optionally perturbed by log-normal noise, which is enough to
//! exercise recorders and reports without linking the engine.

use log::debug;
use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{BenchError, Result};
use crate::recorder::BenchmarkSink;
use crate::report::leading_residual_sum;
use crate::run::SolverRun;

// Shares of the total residual carried by primal, dual, complementarity and optimality.
const RESIDUAL_SPLIT: [f64; 4] = [0.5, 0.3, 0.15, 0.05];

/// Shape of the synthetic convergence history.
#[derive(Clone, Debug)]
pub struct SyntheticOptions {
    /// Total residual before the first iteration.
    pub initial_residual: f64,
    /// Factor applied to the residual at every iteration.
    pub contraction_rate: f64,
    /// Length of each diagnostic vector.
    pub dimension: usize,
    /// Factorization cost reported once per step, in microseconds.
    pub factor_us: f64,
    /// Cost of a single iteration, in microseconds.
    pub iteration_us: f64,
    /// Standard deviation of the log-normal perturbation (0 disables it).
    pub noise: f64,
    /// Seed of the noise generator.
    pub seed: u64,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            initial_residual: 1.0,
            contraction_rate: 0.5,
            dimension: 1,
            factor_us: 0.0,
            iteration_us: 10.0,
            noise: 0.0,
            seed: 0,
        }
    }
}

impl SyntheticOptions {
    /// Set the per-iteration residual reduction factor.
    pub fn with_contraction_rate(mut self, rate: f64) -> Self {
        self.contraction_rate = rate;
        self
    }

    /// Set the length of every diagnostic vector.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the per-step factorization and per-iteration costs in microseconds.
    pub fn with_timings(mut self, factor_us: f64, iteration_us: f64) -> Self {
        self.factor_us = factor_us;
        self.iteration_us = iteration_us;
        self
    }

    /// Enable log-normal noise with the given spread and seed.
    pub fn with_noise(mut self, noise: f64, seed: u64) -> Self {
        self.noise = noise;
        self.seed = seed;
        self
    }
}

/// Result of one synthetic timestep.
#[derive(Clone, Debug)]
pub struct SolveOutcome {
    /// Number of iterations pushed to the sink.
    pub iterations: usize,
    /// Total residual of the last iteration.
    pub final_residual: f64,
    /// Whether the run's precision was reached before the iteration budget ran out.
    pub converged: bool,
}

/// Deterministic replacement for an engine-side solver adapter.
#[derive(Clone, Debug)]
pub struct SyntheticSolver {
    run: SolverRun,
    options: SyntheticOptions,
    rng: SmallRng,
}

impl SyntheticSolver {
    /// Validates the options against the run and seeds the noise generator.
    pub fn new(run: SolverRun, options: SyntheticOptions) -> Result<Self> {
        if options.dimension == 0 {
            return Err(BenchError::dimension_mismatch("synthetic dimension", 1, 0));
        }
        if !options.initial_residual.is_finite() || options.initial_residual <= 0.0 {
            return Err(BenchError::invalid_parameter(
                "initial_residual",
                options.initial_residual,
            ));
        }
        if !options.contraction_rate.is_finite() || options.contraction_rate <= 0.0 {
            return Err(BenchError::invalid_parameter(
                "contraction_rate",
                options.contraction_rate,
            ));
        }
        if !options.noise.is_finite() || options.noise < 0.0 {
            return Err(BenchError::invalid_parameter("noise", options.noise));
        }

        let rng = SmallRng::seed_from_u64(options.seed);
        Ok(Self { run, options, rng })
    }

    /// Configuration this solver iterates under.
    pub fn run(&self) -> &SolverRun {
        &self.run
    }

    /// Runs one timestep against `sink`, from `begin_step` through `end_step`.
    pub fn solve_step<S: BenchmarkSink>(&mut self, sink: &mut S) -> Result<SolveOutcome> {
        sink.begin_step()?;
        sink.record_factorization(self.options.factor_us)?;

        let mut residual = self.options.initial_residual;
        let mut outcome = SolveOutcome {
            iterations: 0,
            final_residual: residual,
            converged: false,
        };

        for iteration in 1..=self.run.max_iterations() {
            residual *= self.options.contraction_rate;
            let observed = residual * self.jitter();

            let [primal, dual, complementarity, optimality] =
                RESIDUAL_SPLIT.map(|share| self.diagnostic(share * observed));
            let total = leading_residual_sum(&primal, &dual, &complementarity, &optimality);
            let elapsed_us = self.options.iteration_us * iteration as f64;
            sink.push_iteration(primal, dual, complementarity, optimality, elapsed_us)?;

            outcome.iterations = iteration;
            outcome.final_residual = total;
            if total <= self.run.precision() {
                outcome.converged = true;
                break;
            }
        }

        sink.end_step()?;
        debug!(
            "{}: {} iterations, residual {:e}, converged = {}",
            self.run.name(),
            outcome.iterations,
            outcome.final_residual,
            outcome.converged
        );
        Ok(outcome)
    }

    fn jitter(&mut self) -> f64 {
        if self.options.noise == 0.0 {
            return 1.0;
        }
        let z: f64 = StandardNormal.sample(&mut self.rng);
        (self.options.noise * z).exp()
    }

    /// Leading component carries `value`; trailing components halve each time.
    fn diagnostic(&self, value: f64) -> DVector<f64> {
        DVector::from_fn(self.options.dimension, |row, _| value * 0.5_f64.powi(row as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{ConvergenceRecorder, RecorderState};
    use crate::report::total_residual;
    use crate::run::SolverKind;

    #[test]
    fn noiseless_run_converges_in_predictable_iterations() {
        let run = SolverRun::new("pgs", SolverKind::Sequential, 200, 1e-3, false).unwrap();
        let options = SyntheticOptions::default()
            .with_dimension(3)
            .with_timings(500.0, 100.0);
        let mut solver = SyntheticSolver::new(run, options).unwrap();
        let mut recorder = ConvergenceRecorder::new();

        let outcome = solver.solve_step(&mut recorder).unwrap();
        // 0.5^10 is the first power of one half below 1e-3.
        assert_eq!(outcome.iterations, 10);
        assert!(outcome.converged);
        assert_eq!(recorder.len(), 10);
        assert_eq!(recorder.dimension(), Some(3));
        assert_eq!(recorder.factor_us(), 500.0);
        assert_eq!(recorder.samples()[9].duration_us(), 1000.0);
        assert_eq!(recorder.state(), RecorderState::StepClosed);

        // The stopping test and the reported curve share one convergence rule.
        let last = recorder.samples().last().unwrap();
        assert_eq!(outcome.final_residual, total_residual(last));
    }

    #[test]
    fn iteration_budget_caps_the_step() {
        let run = SolverRun::new("qp", SolverKind::Qp, 5, 1e-12, true).unwrap();
        let mut solver = SyntheticSolver::new(run, SyntheticOptions::default()).unwrap();
        let mut recorder = ConvergenceRecorder::new();

        let outcome = solver.solve_step(&mut recorder).unwrap();
        assert_eq!(outcome.iterations, 5);
        assert!(!outcome.converged);

        // The next step starts from a cleared recorder.
        solver.solve_step(&mut recorder).unwrap();
        assert_eq!(recorder.len(), 5);
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let run = SolverRun::new("qp", SolverKind::Qp, 20, 1e-12, true).unwrap();
        let options = SyntheticOptions::default().with_noise(0.3, 42);
        let mut first = SyntheticSolver::new(run.clone(), options.clone()).unwrap();
        let mut second = SyntheticSolver::new(run, options).unwrap();
        let mut a = ConvergenceRecorder::new();
        let mut b = ConvergenceRecorder::new();

        first.solve_step(&mut a).unwrap();
        second.solve_step(&mut b).unwrap();
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn rejects_zero_dimension() {
        let run = SolverRun::builder("pgs", SolverKind::Sequential).build().unwrap();
        let options = SyntheticOptions::default().with_dimension(0);
        assert!(matches!(
            SyntheticSolver::new(run, options),
            Err(BenchError::DimensionMismatch { .. })
        ));
    }
}
