use std::time::Duration;

use crate::metrics::backend::{JobOutcome, MetricsBackend};
use crate::selector::SelectionMode;
use crate::solver::SolverStatus;

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_solve(&self, _: SolverStatus, _: Duration) {}

    #[inline(always)]
    fn record_selection(&self, _: &str, _: SelectionMode) {}

    #[inline(always)]
    fn record_outcome(&self, _: &str, _: JobOutcome, _: f64) {}
}
