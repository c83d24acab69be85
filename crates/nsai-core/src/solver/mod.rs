//! Constraint solver: the symbolic layer of runner selection.
//!
//! Given a job, the solver parses its requirements, prunes every runner that violates a hard
//! constraint and ranks the remainder by how many preferred capabilities they carry.
mod explain;

mod result;
pub use result::{PruneReason, SelectionResult, SolverStatus};

use std::{collections::BTreeMap, time::Instant};

use nsai_model::{JobRequirements, JobSpec, RunnerName};
use tracing::{debug, instrument};

use crate::{CoreError, ontology::Ontology, parser::JobRequirementParser};

/// Filters and ranks runners for a job.
///
/// Owns the ontology and the parser; callers mutate either through the `_mut` accessors.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSolver {
    ontology: Ontology,
    parser: JobRequirementParser,
}

impl ConstraintSolver {
    pub fn new(ontology: Ontology, parser: JobRequirementParser) -> Self {
        Self { ontology, parser }
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn ontology_mut(&mut self) -> &mut Ontology {
        &mut self.ontology
    }

    pub fn parser(&self) -> &JobRequirementParser {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut JobRequirementParser {
        &mut self.parser
    }

    /// Parse `job` and solve its requirements. Never fails; infeasibility is a status.
    #[instrument(level = "debug", skip(self, job), fields(job = %job_name))]
    pub fn solve(&self, job: &JobSpec, job_name: &str, include_offline: bool) -> SelectionResult {
        let reqs = self.parser.parse(job, job_name);
        self.solve_requirements(reqs, include_offline)
    }

    /// Solve already parsed requirements.
    ///
    /// Pruning checks run in a fixed order per runner: offline, missing required capability,
    /// present excluded capability. Only the first failing check is reported.
    pub fn solve_requirements(&self, reqs: JobRequirements, include_offline: bool) -> SelectionResult {
        let started = Instant::now();

        let mut feasible = Vec::new();
        let mut pruned: BTreeMap<RunnerName, PruneReason> = BTreeMap::new();

        for runner in self.ontology.runners() {
            if !include_offline && !runner.is_online() {
                pruned.insert(runner.name().to_string(), PruneReason::Offline);
                continue;
            }
            let missing = reqs.missing(runner);
            if !missing.is_empty() {
                let missing = missing.into_iter().map(str::to_string).collect();
                pruned.insert(runner.name().to_string(), PruneReason::Missing(missing));
                continue;
            }
            let forbidden = reqs.forbidden(runner);
            if !forbidden.is_empty() {
                let forbidden = forbidden.into_iter().map(str::to_string).collect();
                pruned.insert(runner.name().to_string(), PruneReason::Excluded(forbidden));
                continue;
            }
            feasible.push(runner);
        }

        let mut ranked: Vec<_> = feasible
            .iter()
            .map(|r| (*r, reqs.preference_score(*r)))
            .collect();
        ranked.sort_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa)
                .then_with(|| a.cost_per_minute().total_cmp(&b.cost_per_minute()))
                .then_with(|| a.name().cmp(b.name()))
        });
        let ranked: Vec<(RunnerName, f64)> = ranked
            .into_iter()
            .map(|(r, score)| (r.name().to_string(), score))
            .collect();

        let (status, explanation) = if ranked.is_empty() {
            (SolverStatus::Infeasible, explain::infeasible(&reqs, &pruned))
        } else {
            (
                SolverStatus::Feasible,
                explain::feasible(&self.ontology, &reqs, &ranked, &pruned),
            )
        };

        let feasible_runners = feasible.iter().map(|r| r.name().to_string()).collect();
        let solve_time = started.elapsed();

        debug!(
            job = %reqs.job_name,
            status = %status,
            feasible = ranked.len(),
            pruned = pruned.len(),
            elapsed_us = solve_time.as_micros() as u64,
            "solve finished"
        );

        SelectionResult {
            status,
            feasible_runners,
            ranked_runners: ranked,
            requirements: reqs,
            pruned_runners: pruned,
            solve_time,
            explanation,
        }
    }

    /// Solve each job independently, online runners only.
    pub fn solve_batch(&self, jobs: &BTreeMap<String, JobSpec>) -> BTreeMap<String, SelectionResult> {
        jobs.iter()
            .map(|(name, job)| (name.clone(), self.solve(job, name, false)))
            .collect()
    }

    /// Solve every job of a CI document.
    pub fn solve_document(&self, yaml: &str) -> Result<BTreeMap<String, SelectionResult>, CoreError> {
        let jobs = crate::parser::document_jobs(yaml)?;
        Ok(self.solve_batch(&jobs))
    }

    /// Highest-ranked online runner for `job`, if any.
    pub fn best_runner(&self, job: &JobSpec, job_name: &str) -> Option<RunnerName> {
        self.solve(job, job_name, false)
            .ranked_runners
            .into_iter()
            .next()
            .map(|(name, _)| name)
    }
}
