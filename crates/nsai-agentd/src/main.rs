use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use nsai_core::prelude::*;
use nsai_observe::{LoggerConfig, init_logger};
use nsai_prometheus::PrometheusMetrics;

mod fleet;
mod replay;

const DEFAULT_ROUNDS: usize = 5;

fn main() -> anyhow::Result<()> {
    // logger first: local timezone detection needs a single-threaded process
    let cfg = LoggerConfig::default().with_env_overrides()?;
    init_logger(&cfg)?;
    info!(format = %cfg.format, level = cfg.level.as_str(), "logger initialized");

    let mut args = std::env::args().skip(1);
    let path = args.next();
    let rounds = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid round count: {n}"))?,
        None => DEFAULT_ROUNDS,
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(path, rounds))
}

async fn run(path: Option<String>, rounds: usize) -> anyhow::Result<()> {
    // 1) pipeline
    let yaml = match &path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {path}"))?,
        None => replay::DEMO_PIPELINE.to_string(),
    };
    let jobs = replay::load_jobs(&yaml)?;
    info!(jobs = jobs.len(), source = path.as_deref().unwrap_or("<builtin>"), "pipeline loaded");

    // 2) fleet
    let mut onto = Ontology::new();
    let profiles = fleet::populate(&mut onto, fleet::reference_fleet());
    info!(runners = onto.len(), "fleet registered");

    // 3) selector + metrics
    let metrics = PrometheusMetrics::new()?;
    let solver = ConstraintSolver::new(onto, JobRequirementParser::new());
    let selector: SharedSelector = Selector::new(solver, nsai_core::selector::DEFAULT_EXPLORATION)
        .with_metrics(Arc::new(metrics.clone()))
        .into();

    // 4) warm start from externally published statistics
    let synced = selector.sync_from_external(&fleet::external_stats()?);
    info!(synced, "external statistics applied");

    // 5) replay
    let mut sim = replay::Simulator::new(profiles);
    let summary = replay::replay(&selector, jobs, rounds, &mut sim).await?;
    info!(
        rounds,
        selected = summary.selected,
        unplaced = summary.unplaced,
        failures = summary.failures,
        "replay finished"
    );

    // 6) report
    println!("{}", serde_json::to_string_pretty(&selector.get_stats())?);
    print!("{}", metrics.encode_text()?);
    Ok(())
}
