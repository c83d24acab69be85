use std::{collections::BTreeMap, fmt, time::Duration};

use nsai_model::{JobRequirements, RunnerName};
use serde::{Serialize, Serializer};

/// Outcome of a solve.
///
/// The solver itself only produces `Feasible` and `Infeasible`;
/// `Timeout` and `Error` exist for embedding services that impose their own deadline or guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverStatus {
    /// At least one runner satisfies the hard constraints.
    Feasible,
    /// No runner satisfies the hard constraints.
    Infeasible,
    /// Solving was cut short by the caller.
    Timeout,
    /// Solving failed outside the core.
    Error,
}

impl SolverStatus {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            SolverStatus::Feasible => "feasible",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Timeout => "timeout",
            SolverStatus::Error => "error",
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Why a runner was removed from the candidate set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PruneReason {
    Offline,
    /// Required capabilities the runner lacks.
    Missing(Vec<String>),
    /// Excluded capabilities the runner has.
    Excluded(Vec<String>),
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneReason::Offline => f.write_str("offline"),
            PruneReason::Missing(caps) => write!(f, "missing: {}", caps.join(", ")),
            PruneReason::Excluded(caps) => write!(f, "has excluded: {}", caps.join(", ")),
        }
    }
}

impl Serialize for PruneReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of one constraint solve.
///
/// Invariants:
/// - every name in `feasible_runners` and `pruned_runners` is a registered runner;
/// - `ranked_runners` is a permutation of `feasible_runners`, ordered by descending preference score,
///   then ascending cost per minute, then ascending name.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    pub status: SolverStatus,
    /// Feasible runners in ascending name order.
    pub feasible_runners: Vec<RunnerName>,
    /// Feasible runners with their preference score, best first.
    pub ranked_runners: Vec<(RunnerName, f64)>,
    pub requirements: JobRequirements,
    pub pruned_runners: BTreeMap<RunnerName, PruneReason>,
    pub solve_time: Duration,
    /// Human-readable account of the solve.
    pub explanation: String,
}

impl SelectionResult {
    pub fn is_feasible(&self) -> bool {
        self.status == SolverStatus::Feasible
    }

    /// Highest-ranked runner, if any.
    pub fn best_runner(&self) -> Option<&str> {
        self.ranked_runners.first().map(|(name, _)| name.as_str())
    }

    pub fn solve_time_ms(&self) -> f64 {
        self.solve_time.as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_reasons_render_human_text() {
        assert_eq!(PruneReason::Offline.to_string(), "offline");
        assert_eq!(
            PruneReason::Missing(vec!["gpu".into(), "arm64".into()]).to_string(),
            "missing: gpu, arm64"
        );
        assert_eq!(
            PruneReason::Excluded(vec!["windows".into()]).to_string(),
            "has excluded: windows"
        );
    }

    #[test]
    fn prune_reason_serializes_as_string() {
        let json = serde_json::to_string(&PruneReason::Missing(vec!["gpu".into()])).unwrap();
        assert_eq!(json, r#""missing: gpu""#);
    }

    #[test]
    fn best_runner_is_first_ranked() {
        let result = SelectionResult {
            status: SolverStatus::Feasible,
            feasible_runners: vec!["a".into(), "b".into()],
            ranked_runners: vec![("b".into(), 1.0), ("a".into(), 0.0)],
            requirements: JobRequirements::new("x"),
            pruned_runners: BTreeMap::new(),
            solve_time: Duration::from_micros(1500),
            explanation: String::new(),
        };

        assert!(result.is_feasible());
        assert_eq!(result.best_runner(), Some("b"));
        assert!((result.solve_time_ms() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn status_labels() {
        assert_eq!(SolverStatus::Feasible.to_string(), "feasible");
        assert_eq!(SolverStatus::Infeasible.as_label(), "infeasible");
    }
}
