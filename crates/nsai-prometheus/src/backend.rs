use std::{sync::Arc, time::Duration};

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use nsai_core::{JobOutcome, MetricsBackend, SelectionMode, SolverStatus};

const NAMESPACE: &str = "nsai";

/// Prometheus metrics backend for the selector.
///
/// ## Label cardinality
/// - `status`: "feasible", "infeasible", "timeout", "error"
/// - `mode`: "exploration", "exploitation"
/// - `outcome`: "success", "failure"
/// - `runner`: one value per registered runner; fleets are expected to stay small
#[derive(Clone)]
pub struct PrometheusMetrics {
    solves: CounterVec,
    solve_duration: Histogram,
    selections: CounterVec,
    outcomes: CounterVec,
    job_duration: HistogramVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register all metrics in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let solves = CounterVec::new(
            Opts::new("solves_total", "Constraint solves by status").namespace(NAMESPACE),
            &["status"],
        )?;
        registry.register(Box::new(solves.clone()))?;

        let solve_duration = Histogram::with_opts(
            HistogramOpts::new("solve_duration_seconds", "Constraint solve wall time in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![1e-5, 5e-5, 1e-4, 5e-4, 1e-3, 5e-3, 1e-2, 5e-2]),
        )?;
        registry.register(Box::new(solve_duration.clone()))?;

        let selections = CounterVec::new(
            Opts::new("selections_total", "Runner selections by runner and mode")
                .namespace(NAMESPACE),
            &["runner", "mode"],
        )?;
        registry.register(Box::new(selections.clone()))?;

        let outcomes = CounterVec::new(
            Opts::new("outcomes_total", "Reported job outcomes by runner").namespace(NAMESPACE),
            &["runner", "outcome"],
        )?;
        registry.register(Box::new(outcomes.clone()))?;

        let job_duration = HistogramVec::new(
            HistogramOpts::new("job_duration_seconds", "Reported job duration in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0, 1800.0, 3600.0]),
            &["runner"],
        )?;
        registry.register(Box::new(job_duration.clone()))?;

        Ok(Self {
            solves,
            solve_duration,
            selections,
            outcomes,
            job_duration,
            registry,
        })
    }

    /// Backend with a fresh private registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_solve(&self, status: SolverStatus, elapsed: Duration) {
        self.solves.with_label_values(&[status.as_label()]).inc();
        self.solve_duration.observe(elapsed.as_secs_f64());
    }

    fn record_selection(&self, runner: &str, mode: SelectionMode) {
        self.selections
            .with_label_values(&[runner, mode.as_label()])
            .inc();
    }

    fn record_outcome(&self, runner: &str, outcome: JobOutcome, duration_secs: f64) {
        self.outcomes
            .with_label_values(&[runner, outcome.as_label()])
            .inc();
        self.job_duration
            .with_label_values(&[runner])
            .observe(duration_secs);
    }
}
