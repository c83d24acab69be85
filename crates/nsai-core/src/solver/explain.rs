//! Text rendering of solve outcomes.
use std::collections::BTreeMap;

use nsai_model::JobRequirements;

use super::PruneReason;
use crate::ontology::Ontology;

/// Number of ranked runners listed in a feasible explanation.
const TOP_RUNNERS: usize = 3;

pub(super) fn feasible(
    onto: &Ontology,
    reqs: &JobRequirements,
    ranked: &[(String, f64)],
    pruned: &BTreeMap<String, PruneReason>,
) -> String {
    let mut lines = vec![format!("Job requires: {}", list_or_none(&reqs.required))];
    if !reqs.preferred.is_empty() {
        lines.push(format!("Prefers: {}", reqs.preferred.join(", ")));
    }
    lines.push(format!("Feasible runners: {}", ranked.len()));

    for (name, score) in ranked.iter().take(TOP_RUNNERS) {
        let cost = onto.runner(name).map_or(0.0, |r| r.cost_per_minute());
        lines.push(format!("  - {name} (score: {score:.2}, cost: {cost:.3}/min)"));
    }
    if !pruned.is_empty() {
        lines.push(format!("Pruned: {} runners", pruned.len()));
    }
    lines.join("\n")
}

pub(super) fn infeasible(reqs: &JobRequirements, pruned: &BTreeMap<String, PruneReason>) -> String {
    let mut lines = vec![
        "No feasible runner found".to_string(),
        format!("Required capabilities: {}", list_or_none(&reqs.required)),
    ];
    if !reqs.excluded.is_empty() {
        lines.push(format!("Excluded capabilities: {}", reqs.excluded.join(", ")));
    }

    lines.push("Reasons:".to_string());
    if pruned.is_empty() {
        lines.push("  - no runners registered".to_string());
    }
    for (name, reason) in pruned {
        lines.push(format!("  - {name}: {reason}"));
    }

    lines.push(String::new());
    lines.push("Suggestions:".to_string());
    lines.push("  - Check if required runners are online".to_string());
    lines.push("  - Verify tag mappings in parser configuration".to_string());
    lines.push("  - Consider adding capabilities to existing runners".to_string());
    lines.join("\n")
}

fn list_or_none(caps: &[String]) -> String {
    if caps.is_empty() {
        "none".to_string()
    } else {
        caps.join(", ")
    }
}
