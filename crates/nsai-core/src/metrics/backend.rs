use std::{sync::Arc, time::Duration};

use crate::solver::SolverStatus;
use crate::selector::SelectionMode;

/// Reported job outcome for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Job finished successfully.
    Success,
    /// Job failed.
    Failure,
}

impl JobOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::Failure => "failure",
        }
    }
}

impl From<bool> for JobOutcome {
    fn from(success: bool) -> Self {
        if success {
            JobOutcome::Success
        } else {
            JobOutcome::Failure
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are handed to the [`crate::Selector`] and called on every solve, selection and
/// reported outcome.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a finished constraint solve.
    ///
    /// # Arguments
    /// - `status`: Solver verdict
    /// - `elapsed`: Wall time spent solving
    fn record_solve(&self, status: SolverStatus, elapsed: Duration);
    /// Record a runner selection.
    ///
    /// # Arguments
    /// - `runner`: Selected runner name
    /// - `mode`: Whether the pick was forced exploration or UCB exploitation
    fn record_selection(&self, runner: &str, mode: SelectionMode);
    /// Record a job outcome reported back for a runner.
    ///
    /// # Arguments
    /// - `runner`: Runner that ran the job
    /// - `outcome`: How the job ended
    /// - `duration_secs`: Job wall time in seconds
    fn record_outcome(&self, runner: &str, outcome: JobOutcome, duration_secs: f64);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
