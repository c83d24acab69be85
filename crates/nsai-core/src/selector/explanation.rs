use std::{fmt, time::Duration};

use nsai_model::RunnerName;
use serde::Serialize;

/// How the statistical layer picked a runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// A feasible runner had no observations yet.
    Exploration,
    /// Every feasible runner was observed; UCB1 decided.
    Exploitation,
}

impl SelectionMode {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            SelectionMode::Exploration => "exploration",
            SelectionMode::Exploitation => "exploitation",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Two-layer account of a selection decision.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub job_name: String,
    /// Constraint solver explanation.
    pub symbolic_reasoning: String,
    /// Bandit explanation.
    pub statistical_reasoning: String,
    pub feasible_runners: Vec<RunnerName>,
    pub chosen_runner: Option<RunnerName>,
    /// `None` when nothing was feasible.
    pub mode: Option<SelectionMode>,
    /// In `[0, 1]`.
    pub confidence: f64,
    /// Solve plus select wall time.
    pub elapsed: Duration,
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Symbolic reasoning ({}) ===", self.job_name)?;
        writeln!(f, "{}", self.symbolic_reasoning)?;
        writeln!(f)?;
        writeln!(f, "=== Statistical reasoning ===")?;
        writeln!(f, "{}", self.statistical_reasoning)?;
        writeln!(f)?;
        match &self.chosen_runner {
            Some(runner) => write!(
                f,
                "Selected: {runner} (confidence: {:.2}, {:.3} ms)",
                self.confidence,
                self.elapsed.as_secs_f64() * 1000.0
            ),
            None => write!(f, "Selected: none"),
        }
    }
}
