//! Replays a CI document through the shared selector.
use std::{collections::BTreeMap, sync::Arc};

use anyhow::Context;
use nsai_core::{CoreError, SharedSelector, parser::document_jobs};
use nsai_model::JobSpec;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::fleet::Profile;

/// Pipeline replayed when no file is given.
pub const DEMO_PIPELINE: &str = "\
stages: [build, test, deploy]

default:
  tags: [docker]

lint:
  stage: build
  image: alpine:3.19
  script: make lint

build:
  stage: build
  image: rust:1.85
  variables:
    CI_RUNNER_MEMORY: 8Gi
    CI_RUNNER_CPU: 4
  script: cargo build --release

train:
  stage: test
  tags: [gpu]
  image: nvidia/cuda:12.2.0-runtime-ubuntu22.04
  timeout: 2h
  script: python train.py

ios:
  stage: test
  tags: [macos]
  script: xcodebuild test

deploy-eu:
  stage: deploy
  tags: [nordic, kubernetes]
  services: [postgres:16]
  script: ./deploy.sh

.windows-template:
  tags: [windows]
";

#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    pub selected: usize,
    pub unplaced: usize,
    pub failures: usize,
}

/// Simulated outcome source with per-runner job counters.
#[derive(Debug)]
pub struct Simulator {
    profiles: BTreeMap<String, Profile>,
    counters: BTreeMap<String, u32>,
}

impl Simulator {
    pub fn new(profiles: BTreeMap<String, Profile>) -> Self {
        Self {
            profiles,
            counters: BTreeMap::new(),
        }
    }

    /// `(success, duration_secs)` of the next job on `runner`.
    fn next(&mut self, runner: &str) -> (bool, f64) {
        let Some(profile) = self.profiles.get(runner) else {
            return (false, 0.0);
        };
        let n = self.counters.entry(runner.to_string()).or_default();
        *n += 1;
        let failed = profile.fail_every != 0 && *n % profile.fail_every == 0;
        (!failed, profile.duration_secs)
    }
}

pub fn load_jobs(yaml: &str) -> Result<BTreeMap<String, JobSpec>, CoreError> {
    document_jobs(yaml)
}

/// Run `rounds` passes over `jobs`. Selections within a round run concurrently.
pub async fn replay(
    selector: &SharedSelector,
    jobs: BTreeMap<String, JobSpec>,
    rounds: usize,
    sim: &mut Simulator,
) -> anyhow::Result<Summary> {
    let jobs = Arc::new(jobs);
    let mut summary = Summary::default();

    for round in 1..=rounds {
        let mut set = JoinSet::new();
        for name in jobs.keys().cloned() {
            let selector = selector.clone();
            let jobs = Arc::clone(&jobs);
            set.spawn(async move {
                let (runner, explanation) = match jobs.get(&name) {
                    Some(job) => selector.select(job, &name),
                    None => return (name, None, None),
                };
                (name, runner, Some(explanation))
            });
        }

        let mut picks = Vec::new();
        while let Some(joined) = set.join_next().await {
            picks.push(joined.context("selection task panicked")?);
        }
        picks.sort_by(|a, b| a.0.cmp(&b.0));

        for (job, runner, explanation) in picks {
            let Some(runner) = runner else {
                summary.unplaced += 1;
                if let Some(explanation) = explanation {
                    warn!(round, job = %job, "job cannot be placed\n{explanation}");
                }
                continue;
            };
            summary.selected += 1;
            if let Some(explanation) = &explanation {
                debug!(round, job = %job, "{explanation}");
            }

            let cost = selector.with(|s| {
                s.ontology()
                    .runner(&runner)
                    .map_or(0.0, |r| r.cost_per_minute())
            });
            let (success, duration) = sim.next(&runner);
            if !success {
                summary.failures += 1;
            }
            selector
                .update(&runner, success, duration, cost)
                .with_context(|| format!("reporting outcome of {job} on {runner}"))?;
        }
        info!(round, selected = summary.selected, "round finished");
    }
    Ok(summary)
}
