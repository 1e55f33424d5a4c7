//! Convergence recording and benchmark reporting for iterative constraint solvers.
//!
//! A physics engine running a projected Gauss-Seidel or QP constraint solver
//! reports, for every iteration of every timestep, its primal and dual
//! residuals, complementarity and optimality gaps and elapsed time. This crate
//! stores those diagnostics and turns them into convergence curves and text
//! reports for comparing solvers. It offers
//!
//! - immutable solver descriptors (`run` module),
//! - step-scoped diagnostic storage behind the [`BenchmarkSink`] capability
//!   (`recorder` and `sample` modules),
//! - curve and summary reduction (`report` module),
//! - side-by-side benchmark bookkeeping (`suite` module), and
//! - a seeded stand-in solver for driving all of the above without an engine
//!   (`synthetic` module).
//!
//! # Quick start
//!
//! ```no_run
//! use solverbench::synthetic::{SyntheticOptions, SyntheticSolver};
//! use solverbench::{BenchmarkSuite, ReportFormatter, SuiteOptions};
//!
//! let options = SuiteOptions::default();
//! let mut suite = BenchmarkSuite::pgs_vs_qp(&options).expect("valid suite");
//!
//! let mut solvers: Vec<SyntheticSolver> = suite
//!     .iter()
//!     .map(|bench| SyntheticSolver::new(bench.run().clone(), SyntheticOptions::default()))
//!     .collect::<Result<_, _>>()
//!     .expect("valid solvers");
//!
//! for (solver, bench) in solvers.iter_mut().zip(suite.iter_mut()) {
//!     solver.solve_step(bench.recorder_mut()).expect("well-formed step");
//! }
//!
//! let formatter = ReportFormatter::default();
//! let (report, plot) = suite.end_step(options.timestep, &formatter);
//! println!("{report}");
//! println!("{} curves", plot.curves.len());
//! ```

pub mod error;
pub mod options;
pub mod recorder;
pub mod report;
pub mod run;
pub mod sample;
pub mod suite;
pub mod synthetic;

pub use error::{BenchError, Result};
pub use options::{ReportOptions, SuiteOptions};
pub use recorder::{BenchmarkSink, ConvergenceRecorder, RecorderState, StepWriter};
pub use report::{AxisScale, Curve, Plot, ReportFormatter, StepSummary};
pub use run::{SolverKind, SolverRun};
pub use sample::IterationSample;
pub use suite::{Benchmark, BenchmarkSuite};
