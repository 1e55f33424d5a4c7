//! Benchmarks compared side by side over a simulation.

use log::debug;

use crate::error::Result;
use crate::options::SuiteOptions;
use crate::recorder::ConvergenceRecorder;
use crate::report::{Plot, ReportFormatter};
use crate::run::{SolverKind, SolverRun};

/// A solver run together with the recorder it reports into.
#[derive(Clone, Debug)]
pub struct Benchmark {
    run: SolverRun,
    recorder: ConvergenceRecorder,
}

impl Benchmark {
    /// Pairs `run` with a fresh idle recorder.
    pub fn new(run: SolverRun) -> Self {
        Self {
            run,
            recorder: ConvergenceRecorder::new(),
        }
    }

    /// Solver configuration of this benchmark.
    pub fn run(&self) -> &SolverRun {
        &self.run
    }

    /// Diagnostics of the last recorded step.
    pub fn recorder(&self) -> &ConvergenceRecorder {
        &self.recorder
    }

    /// Mutable access for the solver adapter feeding this benchmark.
    pub fn recorder_mut(&mut self) -> &mut ConvergenceRecorder {
        &mut self.recorder
    }

    /// Borrowed `(run, recorder)` pair as consumed by the report formatter.
    pub fn entry(&self) -> (&SolverRun, &ConvergenceRecorder) {
        (&self.run, &self.recorder)
    }
}

/// Ordered set of benchmarks plus the simulation clock they are reported against.
#[derive(Clone, Debug, Default)]
pub struct BenchmarkSuite {
    benchmarks: Vec<Benchmark>,
    time: f64,
}

impl BenchmarkSuite {
    /// Empty suite with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the `bench-pgs` / `bench-qp` comparison.
    pub fn pgs_vs_qp(options: &SuiteOptions) -> Result<Self> {
        let pgs = SolverRun::builder("bench-pgs", SolverKind::Sequential)
            .max_iterations(options.iterations)
            .precision(options.precision)
            .build()?;
        let qp = SolverRun::builder("bench-qp", SolverKind::Qp)
            .max_iterations(options.iterations)
            .precision(options.precision)
            .schur_complement(options.schur)
            .build()?;

        let mut suite = Self::new();
        suite.push(Benchmark::new(pgs));
        suite.push(Benchmark::new(qp));
        Ok(suite)
    }

    /// Appends a benchmark; reports list benchmarks in insertion order.
    pub fn push(&mut self, benchmark: Benchmark) {
        debug!("benchmark `{}` added", benchmark.run.name());
        self.benchmarks.push(benchmark);
    }

    /// Number of benchmarks in the suite.
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Whether the suite holds no benchmark.
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Looks up a benchmark by run name.
    pub fn get(&self, name: &str) -> Option<&Benchmark> {
        self.benchmarks.iter().find(|bench| bench.run.name() == name)
    }

    /// Mutable lookup by run name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Benchmark> {
        self.benchmarks
            .iter_mut()
            .find(|bench| bench.run.name() == name)
    }

    /// Iterates over benchmarks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Benchmark> {
        self.benchmarks.iter()
    }

    /// Mutable iteration, used to feed every recorder during a step.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Benchmark> {
        self.benchmarks.iter_mut()
    }

    /// Every benchmark as a `(run, recorder)` pair, in insertion order.
    pub fn entries(&self) -> Vec<(&SolverRun, &ConvergenceRecorder)> {
        self.benchmarks.iter().map(Benchmark::entry).collect()
    }

    /// Simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Moves the simulation clock forward by one timestep.
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
    }

    /// Rewinds the clock to zero and returns every recorder to idle.
    pub fn reset(&mut self) {
        self.time = 0.0;
        for bench in &mut self.benchmarks {
            bench.recorder.reset();
        }
        debug!("suite reset with {} benchmarks", self.benchmarks.len());
    }

    /// Closes a simulation step of length `dt`: advances the clock, then
    /// returns the step's text report and refreshed plot.
    pub fn end_step(&mut self, dt: f64, formatter: &ReportFormatter) -> (String, Plot) {
        self.advance(dt);
        let entries = self.entries();
        let report = formatter.step_report(self.time, &entries);
        let plot = formatter.plot_series(&entries);
        debug!(
            "step ended at t = {}: {} curves plotted",
            self.time,
            plot.curves.len()
        );
        (report, plot)
    }
}
