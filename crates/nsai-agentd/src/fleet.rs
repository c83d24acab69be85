//! Reference fleet used by the demo.
use std::collections::BTreeMap;

use nsai_core::{Ontology, RunnerSpec};
use nsai_model::ExternalRunnerStats;

/// Simulated behaviour of one runner.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    /// Every n-th job on this runner fails; `0` never fails.
    pub fail_every: u32,
    pub duration_secs: f64,
}

pub struct FleetRunner {
    pub spec: RunnerSpec,
    pub profile: Profile,
}

pub fn reference_fleet() -> Vec<FleetRunner> {
    vec![
        FleetRunner {
            spec: RunnerSpec::new("nordic-runner")
                .external_id(101)
                .capabilities(["docker", "nordic", "kubernetes"])
                .tags(["nordic", "docker"])
                .cost_per_minute(0.008)
                .external_tag("gitlab-runner-nordic"),
            profile: Profile {
                fail_every: 25,
                duration_secs: 20.0,
            },
        },
        FleetRunner {
            spec: RunnerSpec::new("gpu-runner")
                .external_id(102)
                .capabilities(["docker", "gpu", "gcp", "x86_64"])
                .tags(["gpu"])
                .cost_per_minute(0.12)
                .external_tag("gitlab-runner-gpu"),
            profile: Profile {
                fail_every: 10,
                duration_secs: 240.0,
            },
        },
        FleetRunner {
            spec: RunnerSpec::new("local-docker")
                .capabilities(["docker", "local", "x86_64"])
                .tags(["docker", "local"]),
            profile: Profile {
                fail_every: 4,
                duration_secs: 45.0,
            },
        },
        FleetRunner {
            spec: RunnerSpec::new("mac-mini")
                .capabilities(["macos", "shell", "arm64", "local"])
                .tags(["macos"]),
            profile: Profile {
                fail_every: 0,
                duration_secs: 90.0,
            },
        },
        FleetRunner {
            spec: RunnerSpec::new("legacy-shell")
                .capabilities(["shell", "linux"])
                .online(false),
            profile: Profile {
                fail_every: 2,
                duration_secs: 30.0,
            },
        },
    ]
}

/// Register the fleet and return each runner's simulation profile.
pub fn populate(onto: &mut Ontology, fleet: Vec<FleetRunner>) -> BTreeMap<String, Profile> {
    fleet
        .into_iter()
        .map(|r| {
            let name = r.spec.name.clone();
            onto.add_runner(r.spec);
            (name, r.profile)
        })
        .collect()
}

/// Statistics as an external service would publish them.
pub const EXTERNAL_STATS: &str = r#"{
  "gitlab-runner-nordic": { "pulls": 50, "meanReward": 2.47, "successRate": 0.96, "avgDuration": 19.6 },
  "gitlab-runner-retired": { "pulls": 12, "meanReward": 0.4, "successRate": 0.5, "avgDuration": 300.0 }
}"#;

pub fn external_stats() -> serde_json::Result<BTreeMap<String, ExternalRunnerStats>> {
    serde_json::from_str(EXTERNAL_STATS)
}
