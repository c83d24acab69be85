use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Per-runner summary published by an external statistics service.
///
/// Only aggregates are available, so consumers reconstruct approximate totals from them.
/// Missing fields fall back to [`Default`]: zero pulls, rewards and durations, and a neutral `0.5` success rate.
/// Both camelCase and snake_case keys are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalRunnerStats {
    /// Number of observed jobs.
    pub pulls: u64,
    /// Average reward per observed job.
    #[serde(alias = "mean_reward")]
    pub mean_reward: f64,
    /// Fraction of successful jobs.
    #[serde(alias = "success_rate")]
    pub success_rate: f64,
    /// Average job duration in seconds.
    #[serde(alias = "avg_duration")]
    pub avg_duration: f64,
}

impl Default for ExternalRunnerStats {
    fn default() -> Self {
        Self {
            pulls: 0,
            mean_reward: 0.0,
            success_rate: 0.5,
            avg_duration: 0.0,
        }
    }
}
