//! Reduction of recorded diagnostics into convergence curves and text summaries.
//!
//! Formatting never fails: a run with nothing to plot is left out of the
//! [`Plot`] and listed in [`Plot::skipped`], the remaining runs still render.

use std::fmt;

use log::{debug, warn};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::options::ReportOptions;
use crate::recorder::ConvergenceRecorder;
use crate::run::SolverRun;
use crate::sample::IterationSample;

/// Scale of a plot axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisScale {
    /// Values plotted as they are.
    Linear,
    /// Base-10 logarithmic axis, the default for residuals.
    Log,
}

/// Convergence scalar of one iteration: the sum of the first component of
/// every diagnostic vector. Further components are ignored.
pub fn total_residual(sample: &IterationSample) -> f64 {
    leading_residual_sum(
        sample.primal(),
        sample.dual(),
        sample.complementarity(),
        sample.optimality(),
    )
}

/// [`total_residual`] over raw diagnostic vectors, each holding at least one component.
pub fn leading_residual_sum(
    primal: &DVector<f64>,
    dual: &DVector<f64>,
    complementarity: &DVector<f64>,
    optimality: &DVector<f64>,
) -> f64 {
    primal[0] + dual[0] + complementarity[0] + optimality[0]
}

/// Total residual of every recorded iteration, in order.
pub fn convergence_series(recorder: &ConvergenceRecorder) -> Vec<f64> {
    recorder.samples().iter().map(total_residual).collect()
}

/// Wall time in milliseconds at each iteration, factorization included.
///
/// Sample durations are already cumulative, so they are offset by the
/// factorization cost rather than summed.
pub fn cumulative_time_series(recorder: &ConvergenceRecorder) -> Vec<f64> {
    let factor_us = recorder.factor_us();
    recorder
        .samples()
        .iter()
        .map(|sample| (factor_us + sample.duration_us()) / 1000.0)
        .collect()
}

/// Per-iteration durations converted to milliseconds.
pub fn duration_series_ms(recorder: &ConvergenceRecorder) -> Vec<f64> {
    recorder
        .samples()
        .iter()
        .map(|sample| sample.duration_us() / 1000.0)
        .collect()
}

/// Reduced view of one run's step, printable in the benchmark report layout.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepSummary {
    /// Run name, printed on the first line.
    pub name: String,
    /// Factorization cost of the step in milliseconds.
    pub factor_ms: f64,
    /// Total residual per iteration.
    pub convergence: Vec<f64>,
    /// Cumulative elapsed time per iteration in milliseconds.
    pub duration_ms: Vec<f64>,
    #[serde(skip)]
    precision: Option<usize>,
}

impl fmt::Display for StepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "factor: {} ms", format_number(self.factor_ms, self.precision))?;
        writeln!(
            f,
            "convergence: {}",
            format_list(&self.convergence, self.precision)
        )?;
        write!(
            f,
            "duration (ms): {}",
            format_list(&self.duration_ms, self.precision)
        )
    }
}

/// One labeled convergence curve: time in milliseconds against total residual.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Curve {
    /// Legend entry, the run name.
    pub label: String,
    /// X coordinates: factorization plus elapsed time, in milliseconds.
    pub time_ms: Vec<f64>,
    /// Y coordinates: total residual per iteration.
    pub residual: Vec<f64>,
}

impl Curve {
    /// `(time_ms, residual)` pairs in iteration order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time_ms.iter().copied().zip(self.residual.iter().copied())
    }

    /// Number of points on the curve.
    pub fn len(&self) -> usize {
        self.time_ms.len()
    }

    /// Whether the curve has no point.
    pub fn is_empty(&self) -> bool {
        self.time_ms.is_empty()
    }
}

/// Curves sharing a residual axis, ready for an external plotting backend.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Plot {
    /// Scale of the shared residual axis.
    pub y_scale: AxisScale,
    /// One curve per plotted run, in input order.
    pub curves: Vec<Curve>,
    /// Labels of runs left out because they recorded no iteration.
    pub skipped: Vec<String>,
}

impl Plot {
    /// Finds the curve drawn for the run named `label`.
    pub fn curve(&self, label: &str) -> Option<&Curve> {
        self.curves.iter().find(|curve| curve.label == label)
    }
}

/// Renders summaries and plot data for a set of solver runs.
#[derive(Clone, Debug, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Formatter with explicit rendering options.
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Options this formatter renders with.
    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// See [`total_residual`].
    pub fn total_residual(&self, sample: &IterationSample) -> f64 {
        total_residual(sample)
    }

    /// See [`cumulative_time_series`].
    pub fn cumulative_time_series(&self, recorder: &ConvergenceRecorder) -> Vec<f64> {
        cumulative_time_series(recorder)
    }

    /// Collects the numbers printed for one run.
    pub fn summary(&self, run: &SolverRun, recorder: &ConvergenceRecorder) -> StepSummary {
        StepSummary {
            name: run.name().to_string(),
            factor_ms: recorder.factor_us() / 1000.0,
            convergence: convergence_series(recorder),
            duration_ms: duration_series_ms(recorder),
            precision: self.options.precision,
        }
    }

    /// Name, factorization time, residual sequence and duration sequence of one run.
    pub fn summary_text(&self, run: &SolverRun, recorder: &ConvergenceRecorder) -> String {
        self.summary(run, recorder).to_string()
    }

    /// Report for every run at simulation time `time`, each summary followed by a blank line.
    pub fn step_report(&self, time: f64, runs: &[(&SolverRun, &ConvergenceRecorder)]) -> String {
        let mut report = format!("t = {}\n\n", format_number(time, self.options.precision));
        for (run, recorder) in runs {
            report.push_str(&self.summary_text(run, recorder));
            report.push_str("\n\n");
        }
        report
    }

    /// Builds one curve per run on a shared residual axis.
    pub fn plot_series(&self, runs: &[(&SolverRun, &ConvergenceRecorder)]) -> Plot {
        let mut curves = Vec::with_capacity(runs.len());
        let mut skipped = Vec::new();

        for (run, recorder) in runs {
            let time_ms = cumulative_time_series(recorder);
            let residual = convergence_series(recorder);

            // Both series map the same samples, so they always have equal length.
            if time_ms.is_empty() {
                warn!("skipping curve `{}`: no recorded iterations", run.name());
                skipped.push(run.name().to_string());
                continue;
            }

            curves.push(Curve {
                label: run.name().to_string(),
                time_ms,
                residual,
            });
        }

        debug!(
            "plot built with {} curves, {} skipped",
            curves.len(),
            skipped.len()
        );
        Plot {
            y_scale: self.options.y_scale,
            curves,
            skipped,
        }
    }
}

fn format_number(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(decimals) => format!("{value:.decimals$}"),
        None => format!("{value:?}"),
    }
}

fn format_list(values: &[f64], precision: Option<usize>) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|value| format_number(*value, precision))
        .collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    use super::*;
    use crate::recorder::BenchmarkSink;
    use crate::run::SolverKind;

    fn v(values: &[f64]) -> DVector<f64> {
        DVector::from_row_slice(values)
    }

    fn two_iteration_recorder() -> ConvergenceRecorder {
        let mut recorder = ConvergenceRecorder::new();
        recorder.begin_step().unwrap();
        recorder.record_factorization(500.0).unwrap();
        recorder
            .push_iteration(v(&[1.0]), v(&[0.5]), v(&[0.1]), v(&[0.0]), 1000.0)
            .unwrap();
        recorder
            .push_iteration(v(&[0.4]), v(&[0.2]), v(&[0.05]), v(&[0.0]), 1600.0)
            .unwrap();
        recorder.end_step().unwrap();
        recorder
    }

    #[test]
    fn time_series_offsets_cumulative_durations_by_factorization() {
        let recorder = two_iteration_recorder();
        let time = cumulative_time_series(&recorder);
        assert_eq!(time.len(), 2);
        assert_relative_eq!(time[0], 1.5, epsilon = 1e-12);
        assert_relative_eq!(time[1], 2.1, epsilon = 1e-12);

        let residuals = convergence_series(&recorder);
        assert_relative_eq!(residuals[0], 1.6, epsilon = 1e-12);
        assert_relative_eq!(residuals[1], 0.65, epsilon = 1e-12);
    }

    #[test]
    fn total_residual_uses_first_components_only() {
        let mut recorder = ConvergenceRecorder::new();
        recorder.begin_step().unwrap();
        recorder
            .push_iteration(
                v(&[1.0, 100.0]),
                v(&[2.0, 100.0]),
                v(&[3.0, 100.0]),
                v(&[4.0, 100.0]),
                1.0,
            )
            .unwrap();
        assert_eq!(total_residual(&recorder.samples()[0]), 10.0);
    }

    #[test]
    fn summary_text_follows_report_layout() {
        let run = SolverRun::builder("bench-pgs", SolverKind::Sequential)
            .build()
            .unwrap();
        let mut recorder = ConvergenceRecorder::new();
        recorder.begin_step().unwrap();
        recorder.record_factorization(500.0).unwrap();
        recorder
            .push_iteration(v(&[1.0]), v(&[0.5]), v(&[0.25]), v(&[0.0]), 1000.0)
            .unwrap();
        recorder
            .push_iteration(v(&[0.5]), v(&[0.25]), v(&[0.0]), v(&[0.0]), 1500.0)
            .unwrap();
        recorder.end_step().unwrap();

        let text = ReportFormatter::default().summary_text(&run, &recorder);
        assert_eq!(
            text,
            "bench-pgs\nfactor: 0.5 ms\nconvergence: [1.75, 0.75]\nduration (ms): [1.0, 1.5]"
        );

        let fixed = ReportFormatter::new(ReportOptions::default().with_precision(2));
        assert_eq!(
            fixed.summary_text(&run, &recorder),
            "bench-pgs\nfactor: 0.50 ms\nconvergence: [1.75, 0.75]\nduration (ms): [1.00, 1.50]"
        );
    }

    #[test]
    fn plot_skips_empty_runs() {
        let pgs = SolverRun::builder("bench-pgs", SolverKind::Sequential)
            .build()
            .unwrap();
        let qp = SolverRun::builder("bench-qp", SolverKind::Qp)
            .schur_complement(true)
            .build()
            .unwrap();
        let filled = two_iteration_recorder();
        let mut empty = ConvergenceRecorder::new();
        empty.begin_step().unwrap();
        empty.end_step().unwrap();

        let plot = ReportFormatter::default().plot_series(&[(&pgs, &filled), (&qp, &empty)]);
        assert_eq!(plot.y_scale, AxisScale::Log);
        assert_eq!(plot.curves.len(), 1);
        assert_eq!(plot.skipped, vec!["bench-qp".to_string()]);

        let curve = plot.curve("bench-pgs").unwrap();
        let points: Vec<(f64, f64)> = curve.points().collect();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[1].0, 2.1, epsilon = 1e-12);
        assert_relative_eq!(points[1].1, 0.65, epsilon = 1e-12);
    }
}
