use nsai_model::ExternalRunnerStats;
use serde::{Deserialize, Serialize};

/// Added to the reward denominator so instant successes stay finite.
const REWARD_FLOOR_MINUTES: f64 = 0.1;

/// Success rate reported for a runner with no observations.
const NEUTRAL_SUCCESS_RATE: f64 = 0.5;

/// Per-runner bandit counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerStatistics {
    pulls: u64,
    cumulative_reward: f64,
    successes: u64,
    failures: u64,
    /// Seconds.
    cumulative_duration: f64,
}

impl RunnerStatistics {
    pub fn pulls(&self) -> u64 {
        self.pulls
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn cumulative_duration(&self) -> f64 {
        self.cumulative_duration
    }

    /// Average reward per pull, `0.0` before the first pull.
    pub fn mean_reward(&self) -> f64 {
        if self.pulls == 0 {
            0.0
        } else {
            self.cumulative_reward / self.pulls as f64
        }
    }

    /// Fraction of successful outcomes, `0.5` without observations.
    pub fn success_rate(&self) -> f64 {
        let observed = self.successes + self.failures;
        if observed == 0 {
            NEUTRAL_SUCCESS_RATE
        } else {
            self.successes as f64 / observed as f64
        }
    }

    /// Average duration in seconds, `0.0` before the first pull.
    pub fn avg_duration(&self) -> f64 {
        if self.pulls == 0 {
            0.0
        } else {
            self.cumulative_duration / self.pulls as f64
        }
    }

    /// Apply one observed outcome and return the reward it earned.
    pub(crate) fn record(&mut self, success: bool, duration_secs: f64, cost_per_minute: f64) -> f64 {
        let reward = reward(success, duration_secs, cost_per_minute);
        self.pulls = self.pulls.saturating_add(1);
        self.cumulative_reward += reward;
        self.cumulative_duration += duration_secs;
        if success {
            self.successes = self.successes.saturating_add(1);
        } else {
            self.failures = self.failures.saturating_add(1);
        }
        reward
    }

    /// Rebuild approximate totals from an aggregate summary.
    pub(crate) fn from_summary(summary: &ExternalRunnerStats) -> Self {
        let pulls = summary.pulls;
        let successes = ((pulls as f64) * summary.success_rate)
            .round()
            .clamp(0.0, pulls as f64) as u64;

        Self {
            pulls,
            cumulative_reward: summary.mean_reward * pulls.max(1) as f64,
            successes,
            failures: pulls.saturating_sub(successes),
            cumulative_duration: pulls as f64 * summary.avg_duration,
        }
    }

    pub fn summary(&self) -> RunnerSummary {
        RunnerSummary {
            pulls: self.pulls,
            mean_reward: self.mean_reward(),
            success_rate: self.success_rate(),
            avg_duration: self.avg_duration(),
        }
    }
}

/// Reward for one outcome: faster and cheaper successes earn more, failures earn nothing.
pub fn reward(success: bool, duration_secs: f64, cost_per_minute: f64) -> f64 {
    if !success {
        return 0.0;
    }
    let minutes = duration_secs / 60.0;
    1.0 / (minutes + cost_per_minute * minutes + REWARD_FLOOR_MINUTES)
}

/// Flat per-runner view returned by [`super::Selector::get_stats`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerSummary {
    pub pulls: u64,
    pub mean_reward: f64,
    pub success_rate: f64,
    /// Seconds.
    pub avg_duration: f64,
}

impl From<&RunnerSummary> for ExternalRunnerStats {
    fn from(s: &RunnerSummary) -> Self {
        Self {
            pulls: s.pulls,
            mean_reward: s.mean_reward,
            success_rate: s.success_rate,
            avg_duration: s.avg_duration,
        }
    }
}
