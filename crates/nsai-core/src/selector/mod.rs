//! Neurosymbolic selector: UCB1 over the constraint solver's feasible set.
//!
//! The solver decides which runners *may* run a job. The selector decides which of those
//! *should*, learning from outcomes reported through [`Selector::update`].
//!
//! Selection rules:
//! - nothing feasible: no runner, confidence `0`;
//! - a feasible runner without observations: pick it (lowest name first), confidence `0.5`;
//! - otherwise: maximum `mean + c * sqrt(ln(total + 1) / pulls)`, lowest name on ties.
mod config;
pub use config::{DEFAULT_EXPLORATION, SelectorConfig};

mod explanation;
pub use explanation::{Explanation, SelectionMode};

mod shared;
pub use shared::SharedSelector;

mod stats;
pub use stats::{RunnerStatistics, RunnerSummary, reward};

use std::{collections::BTreeMap, fmt, time::Instant};

use nsai_model::{ExternalRunnerStats, JobSpec, RunnerName};
use tracing::{debug, info, instrument};

use crate::{
    CoreError,
    metrics::{JobOutcome, MetricsHandle, noop_metrics},
    ontology::Ontology,
    parser::JobRequirementParser,
    solver::ConstraintSolver,
};

/// Confidence reported for a forced exploration pick.
const EXPLORATION_CONFIDENCE: f64 = 0.5;

/// Keeps the confidence ratio finite when the runner-up scores zero.
const CONFIDENCE_EPSILON: f64 = 0.001;

/// Runner selector combining hard constraints with a UCB1 bandit.
#[derive(Clone)]
pub struct Selector {
    solver: ConstraintSolver,
    stats: BTreeMap<RunnerName, RunnerStatistics>,
    exploration: f64,
    include_offline: bool,
    metrics: MetricsHandle,
}

impl Selector {
    /// Create a selector over `solver` with exploration constant `exploration`.
    ///
    /// Every runner the ontology knows right now starts with zero statistics.
    pub fn new(solver: ConstraintSolver, exploration: f64) -> Self {
        let stats = solver
            .ontology()
            .runner_names()
            .map(|name| (name.to_string(), RunnerStatistics::default()))
            .collect();

        Self {
            solver,
            stats,
            exploration,
            include_offline: false,
            metrics: noop_metrics(),
        }
    }

    /// Build parser, solver and selector from validated configuration.
    pub fn from_config(ontology: Ontology, config: &SelectorConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let parser = JobRequirementParser::from_config(&config.parser);
        let mut selector = Self::new(ConstraintSolver::new(ontology, parser), config.exploration);
        selector.include_offline = config.include_offline;
        Ok(selector)
    }

    /// Replace the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn solver(&self) -> &ConstraintSolver {
        &self.solver
    }

    /// Mutable solver access, e.g. to register runners.
    ///
    /// Runners added this way have no statistics until [`Selector::track_new_runners`] is called;
    /// they are still picked for exploration when feasible.
    pub fn solver_mut(&mut self) -> &mut ConstraintSolver {
        &mut self.solver
    }

    pub fn ontology(&self) -> &Ontology {
        self.solver.ontology()
    }

    pub fn exploration(&self) -> f64 {
        self.exploration
    }

    /// Pick a runner for `job`.
    #[instrument(level = "debug", skip(self, job), fields(job = %job_name))]
    pub fn select(&self, job: &JobSpec, job_name: &str) -> (Option<RunnerName>, Explanation) {
        let started = Instant::now();
        let result = self.solver.solve(job, job_name, self.include_offline);
        self.metrics.record_solve(result.status, result.solve_time);

        let mut explanation = Explanation {
            job_name: job_name.to_string(),
            symbolic_reasoning: result.explanation.clone(),
            statistical_reasoning: String::new(),
            feasible_runners: result.feasible_runners.clone(),
            chosen_runner: None,
            mode: None,
            confidence: 0.0,
            elapsed: Default::default(),
        };

        if !result.is_feasible() {
            explanation.statistical_reasoning = "N/A — no feasible runners".to_string();
            explanation.elapsed = started.elapsed();
            info!(job = job_name, "no feasible runner");
            return (None, explanation);
        }

        let (chosen, mode, confidence, reasoning) = match self.unexplored(&result.feasible_runners) {
            Some(name) => (
                name.to_string(),
                SelectionMode::Exploration,
                EXPLORATION_CONFIDENCE,
                format!("{name}: unexplored, selecting for exploration"),
            ),
            None => {
                let (name, confidence, reasoning) = self.ucb_pick(&result.feasible_runners);
                (name, SelectionMode::Exploitation, confidence, reasoning)
            }
        };

        self.metrics.record_selection(&chosen, mode);
        info!(
            job = job_name,
            runner = %chosen,
            mode = %mode,
            confidence,
            "runner selected"
        );

        explanation.statistical_reasoning = reasoning;
        explanation.chosen_runner = Some(chosen.clone());
        explanation.mode = Some(mode);
        explanation.confidence = confidence;
        explanation.elapsed = started.elapsed();
        (Some(chosen), explanation)
    }

    /// First feasible runner, by name, that has never been observed.
    fn unexplored<'a>(&self, feasible: &'a [RunnerName]) -> Option<&'a str> {
        let mut names: Vec<&str> = feasible.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
            .into_iter()
            .find(|name| self.stats.get(*name).is_none_or(|s| s.pulls() == 0))
    }

    /// UCB1 argmax over fully observed runners.
    fn ucb_pick(&self, feasible: &[RunnerName]) -> (RunnerName, f64, String) {
        let mut candidates: Vec<(&str, &RunnerStatistics)> = feasible
            .iter()
            .filter_map(|name| self.stats.get(name).map(|s| (name.as_str(), s)))
            .collect();
        candidates.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let total = candidates
            .iter()
            .fold(0u64, |acc, (_, s)| acc.saturating_add(s.pulls()));
        let log_total = (total as f64 + 1.0).ln();

        let mut lines = vec![format!(
            "UCB1 (c = {:.2}, total pulls = {total}):",
            self.exploration
        )];
        let mut scored: Vec<(&str, f64)> = Vec::with_capacity(candidates.len());
        for (name, s) in &candidates {
            let mean = s.mean_reward();
            let bonus = self.exploration * (log_total / s.pulls() as f64).sqrt();
            let ucb = mean + bonus;
            lines.push(format!(
                "  - {name}: mean {mean:.4}, bonus {bonus:.4}, ucb {ucb:.4} ({} pulls)",
                s.pulls()
            ));
            scored.push((name, ucb));
        }

        // strictly greater keeps the lowest name on ties
        let mut best = scored[0];
        for &(name, ucb) in &scored[1..] {
            if ucb > best.1 {
                best = (name, ucb);
            }
        }

        let confidence = if scored.len() == 1 {
            1.0
        } else {
            let mut values: Vec<f64> = scored.iter().map(|(_, u)| *u).collect();
            values.sort_unstable_by(|a, b| b.total_cmp(a));
            (values[0] / (values[1] + CONFIDENCE_EPSILON)).min(1.0)
        };

        lines.push(format!("Selected {} (highest ucb {:.4})", best.0, best.1));
        (best.0.to_string(), confidence, lines.join("\n"))
    }

    /// Record the outcome of a job that ran on `runner`.
    ///
    /// Fails with [`CoreError::UnknownRunner`] when the runner has no statistics entry.
    pub fn update(
        &mut self,
        runner: &str,
        success: bool,
        duration_secs: f64,
        cost_per_minute: f64,
    ) -> Result<(), CoreError> {
        let stats = self
            .stats
            .get_mut(runner)
            .ok_or_else(|| CoreError::UnknownRunner(runner.to_string()))?;

        let reward = stats.record(success, duration_secs, cost_per_minute);
        self.metrics
            .record_outcome(runner, JobOutcome::from(success), duration_secs);

        debug!(
            runner,
            success,
            duration_secs,
            reward,
            pulls = stats.pulls(),
            "outcome recorded"
        );
        Ok(())
    }

    /// Flat summary of every tracked runner.
    pub fn get_stats(&self) -> BTreeMap<RunnerName, RunnerSummary> {
        self.stats
            .iter()
            .map(|(name, s)| (name.clone(), s.summary()))
            .collect()
    }

    pub fn statistics(&self, runner: &str) -> Option<&RunnerStatistics> {
        self.stats.get(runner)
    }

    /// Overwrite statistics from an external summary.
    ///
    /// Keys are resolved as runner names first, then as external tags. Unresolvable keys are skipped.
    /// Returns the number of runners overwritten.
    pub fn sync_from_external(&mut self, external: &BTreeMap<String, ExternalRunnerStats>) -> usize {
        let mut synced = 0;
        for (key, summary) in external {
            let onto = self.solver.ontology();
            let name = if onto.contains_runner(key) {
                key.clone()
            } else if let Some(name) = onto.resolve_external_tag(key) {
                name.to_string()
            } else {
                debug!(key = %key, "external statistics skipped, no matching runner");
                continue;
            };

            debug!(runner = %name, key = %key, pulls = summary.pulls, "statistics synced");
            self.stats.insert(name, RunnerStatistics::from_summary(summary));
            synced += 1;
        }
        synced
    }

    /// Seed zero statistics for runners registered after construction.
    ///
    /// Returns the number of runners added.
    pub fn track_new_runners(&mut self) -> usize {
        let mut added = 0;
        for name in self.solver.ontology().runner_names() {
            if !self.stats.contains_key(name) {
                self.stats.insert(name.to_string(), RunnerStatistics::default());
                added += 1;
            }
        }
        added
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("runners", &self.solver.ontology().len())
            .field("tracked", &self.stats.len())
            .field("exploration", &self.exploration)
            .field("include_offline", &self.include_offline)
            .field("metrics", &"<handle>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    use super::*;
    use crate::{metrics::MetricsBackend, ontology::RunnerSpec, solver::SolverStatus};

    fn selector() -> Selector {
        let mut onto = Ontology::new();
        onto.add_runner(RunnerSpec::new("r1").capabilities(["docker"]));
        onto.add_runner(
            RunnerSpec::new("r2")
                .capabilities(["docker", "gpu"])
                .cost_per_minute(0.02)
                .external_tag("gitlab-r2"),
        );
        Selector::new(ConstraintSolver::new(onto, JobRequirementParser::new()), 2.0)
    }

    fn docker_job() -> JobSpec {
        JobSpec::new().with_tags(["docker"])
    }

    #[test]
    fn seeds_zero_statistics_for_known_runners() {
        let sel = selector();
        let stats = sel.get_stats();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats["r1"].pulls, 0);
        assert_eq!(stats["r1"].success_rate, 0.5);
    }

    #[test]
    fn infeasible_job_selects_nothing() {
        let sel = selector();
        let (runner, expl) = sel.select(&JobSpec::new().with_tags(["kubernetes"]), "deploy");

        assert_eq!(runner, None);
        assert_eq!(expl.confidence, 0.0);
        assert_eq!(expl.mode, None);
        assert_eq!(expl.statistical_reasoning, "N/A — no feasible runners");
        assert!(expl.symbolic_reasoning.contains("No feasible runner found"));
    }

    #[test]
    fn unexplored_runners_go_first_by_name() {
        let mut sel = selector();

        let (first, expl) = sel.select(&docker_job(), "build");
        assert_eq!(first.as_deref(), Some("r1"));
        assert_eq!(expl.mode, Some(SelectionMode::Exploration));
        assert_eq!(expl.confidence, 0.5);
        assert!(expl.statistical_reasoning.contains("unexplored, selecting for exploration"));

        sel.update("r1", true, 30.0, 0.0).unwrap();
        let (second, _) = sel.select(&docker_job(), "build");
        assert_eq!(second.as_deref(), Some("r2"));
    }

    #[test]
    fn ucb_prefers_higher_mean_and_reports_components() {
        let mut sel = selector();
        for _ in 0..5 {
            sel.update("r1", true, 15.0, 0.0).unwrap();
            sel.update("r2", false, 60.0, 0.0).unwrap();
        }

        let (runner, expl) = sel.select(&docker_job(), "build");

        assert_eq!(runner.as_deref(), Some("r1"));
        assert_eq!(expl.mode, Some(SelectionMode::Exploitation));
        assert!(expl.statistical_reasoning.contains("UCB1 (c = 2.00, total pulls = 10)"));
        assert!(expl.statistical_reasoning.contains("Selected r1"));
        assert!(expl.confidence > 0.0 && expl.confidence <= 1.0);
    }

    #[test]
    fn ucb_ties_break_by_name() {
        let mut sel = selector();
        sel.update("r1", true, 60.0, 0.0).unwrap();
        sel.update("r2", true, 60.0, 0.0).unwrap();

        let (runner, expl) = sel.select(&docker_job(), "build");

        assert_eq!(runner.as_deref(), Some("r1"));
        // equal ucb values: top / (top + eps) < 1
        assert!(expl.confidence < 1.0);
    }

    #[test]
    fn single_candidate_has_full_confidence() {
        let mut sel = selector();
        sel.update("r2", true, 60.0, 0.0).unwrap();

        let (runner, expl) = sel.select(&JobSpec::new().with_tags(["gpu"]), "train");

        assert_eq!(runner.as_deref(), Some("r2"));
        assert_eq!(expl.confidence, 1.0);
    }

    #[test]
    fn update_unknown_runner_fails() {
        let mut sel = selector();
        let err = sel.update("ghost", true, 1.0, 0.0).unwrap_err();
        assert!(matches!(err, CoreError::UnknownRunner(ref n) if n == "ghost"));
        assert_eq!(err.to_string(), "unknown runner: ghost");
    }

    #[test]
    fn failed_update_adds_no_reward() {
        let mut sel = selector();
        sel.update("r1", false, 5.0, 3.0).unwrap();

        let stats = sel.statistics("r1").unwrap();
        assert_eq!(stats.pulls(), 1);
        assert_eq!(stats.cumulative_reward(), 0.0);
        assert_eq!(stats.failures(), 1);
    }

    #[test]
    fn sync_resolves_names_then_tags_and_skips_unknown() {
        let mut sel = selector();
        sel.update("r1", true, 10.0, 0.0).unwrap();

        let external = BTreeMap::from([
            (
                "r1".to_string(),
                ExternalRunnerStats {
                    pulls: 4,
                    mean_reward: 1.0,
                    success_rate: 0.5,
                    avg_duration: 30.0,
                },
            ),
            (
                "gitlab-r2".to_string(),
                ExternalRunnerStats {
                    pulls: 10,
                    success_rate: 0.25,
                    ..Default::default()
                },
            ),
            ("elsewhere".to_string(), ExternalRunnerStats::default()),
        ]);

        assert_eq!(sel.sync_from_external(&external), 2);

        let r1 = sel.statistics("r1").unwrap();
        assert_eq!(r1.pulls(), 4);
        assert_eq!(r1.successes(), 2);
        assert_eq!(r1.cumulative_duration(), 120.0);

        let r2 = sel.statistics("r2").unwrap();
        assert_eq!(r2.pulls(), 10);
        assert_eq!(r2.successes(), 3);
        assert_eq!(r2.failures(), 7);
        assert!(sel.statistics("elsewhere").is_none());
    }

    #[test]
    fn huge_synced_pull_counts_still_select() {
        let mut sel = selector();
        let external = BTreeMap::from([
            (
                "r1".to_string(),
                ExternalRunnerStats {
                    pulls: u64::MAX,
                    mean_reward: 1.0,
                    ..Default::default()
                },
            ),
            (
                "r2".to_string(),
                ExternalRunnerStats {
                    pulls: 5,
                    ..Default::default()
                },
            ),
        ]);
        assert_eq!(sel.sync_from_external(&external), 2);

        let (runner, explanation) = sel.select(&docker_job(), "build");
        assert!(runner.is_some());
        assert!(explanation.confidence.is_finite());

        sel.update("r1", true, 60.0, 0.0).unwrap();
        assert_eq!(sel.statistics("r1").unwrap().pulls(), u64::MAX);
    }

    #[test]
    fn late_runners_are_explored_then_tracked() {
        let mut sel = selector();
        sel.update("r1", true, 10.0, 0.0).unwrap();
        sel.update("r2", true, 10.0, 0.0).unwrap();
        sel.solver_mut()
            .ontology_mut()
            .add_runner(RunnerSpec::new("r0").capabilities(["docker"]));

        let (runner, _) = sel.select(&docker_job(), "build");
        assert_eq!(runner.as_deref(), Some("r0"));
        assert!(sel.update("r0", true, 10.0, 0.0).is_err());

        assert_eq!(sel.track_new_runners(), 1);
        assert!(sel.update("r0", true, 10.0, 0.0).is_ok());
        assert_eq!(sel.track_new_runners(), 0);
    }

    #[test]
    fn from_config_validates_and_applies() {
        let mut onto = Ontology::new();
        onto.add_runner(RunnerSpec::new("idle").capabilities(["shell"]).online(false));

        let bad = SelectorConfig {
            exploration: -1.0,
            ..Default::default()
        };
        assert!(Selector::from_config(onto.clone(), &bad).is_err());

        let cfg = SelectorConfig {
            exploration: 0.5,
            include_offline: true,
            ..Default::default()
        };
        let sel = Selector::from_config(onto, &cfg).unwrap();
        assert_eq!(sel.exploration(), 0.5);

        let (runner, _) = sel.select(&JobSpec::new().with_tags(["shell"]), "script");
        assert_eq!(runner.as_deref(), Some("idle"));
    }

    #[derive(Default)]
    struct Counting {
        solves: AtomicUsize,
        selections: AtomicUsize,
        outcomes: AtomicUsize,
    }

    impl MetricsBackend for Counting {
        fn record_solve(&self, _: SolverStatus, _: Duration) {
            self.solves.fetch_add(1, Ordering::Relaxed);
        }

        fn record_selection(&self, _: &str, _: SelectionMode) {
            self.selections.fetch_add(1, Ordering::Relaxed);
        }

        fn record_outcome(&self, _: &str, _: JobOutcome, _: f64) {
            self.outcomes.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn metrics_backend_sees_every_event() {
        let metrics = Arc::new(Counting::default());
        let mut sel = selector().with_metrics(metrics.clone());

        sel.select(&docker_job(), "build");
        sel.select(&JobSpec::new().with_tags(["kubernetes"]), "deploy");
        sel.update("r1", true, 1.0, 0.0).unwrap();

        assert_eq!(metrics.solves.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.selections.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.outcomes.load(Ordering::Relaxed), 1);
    }
}
