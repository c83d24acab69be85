use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Ontology, RunnerSpec};
use crate::error::CoreError;

/// Flat, persistable form of an [`Ontology`].
///
/// Restoring goes through [`Ontology::add_runner`], so capability closure is re-derived rather than trusted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologySnapshot {
    /// Every registered capability name.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Runners keyed by name.
    #[serde(default)]
    pub runners: BTreeMap<String, RunnerSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<u64>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_online")]
    pub online: bool,
    #[serde(default)]
    pub cost_per_minute: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_tag: Option<String>,
}

fn default_online() -> bool {
    true
}

impl RunnerSnapshot {
    fn into_spec(self, name: String) -> RunnerSpec {
        RunnerSpec {
            name,
            external_id: self.external_id,
            capabilities: self.capabilities,
            tags: self.tags,
            cost_per_minute: self.cost_per_minute,
            online: self.online,
            external_tag: self.external_tag,
        }
    }
}

impl Ontology {
    /// Capture the current state as a snapshot.
    pub fn to_snapshot(&self) -> OntologySnapshot {
        let runners = self
            .runners()
            .map(|r| {
                (
                    r.name().to_string(),
                    RunnerSnapshot {
                        external_id: r.external_id(),
                        capabilities: r.capability_names().map(str::to_string).collect(),
                        tags: r.tags().to_vec(),
                        online: r.is_online(),
                        cost_per_minute: r.cost_per_minute(),
                        external_tag: r.external_tag().map(str::to_string),
                    },
                )
            })
            .collect();

        OntologySnapshot {
            capabilities: self.capabilities().map(|c| c.name().to_string()).collect(),
            runners,
        }
    }

    /// Rebuild an ontology from a snapshot on top of the standard taxonomy.
    ///
    /// Capability names the taxonomy does not know are restored as custom capabilities.
    pub fn from_snapshot(snapshot: OntologySnapshot) -> Self {
        let mut onto = Ontology::new();
        for name in snapshot.capabilities {
            if onto.capability(&name).is_none() {
                onto.add_capability(name, nsai_model::CapabilityType::Custom, "");
            }
        }
        for (name, runner) in snapshot.runners {
            onto.add_runner(runner.into_spec(name));
        }
        onto
    }

    /// Serialize the snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| CoreError::Snapshot(e.to_string()))
    }

    /// Restore an ontology from JSON produced by [`Ontology::to_json`].
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let snapshot: OntologySnapshot =
            serde_json::from_str(json).map_err(|e| CoreError::Snapshot(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsai_model::CapabilityType;

    fn sample() -> Ontology {
        let mut onto = Ontology::new();
        onto.add_runner(
            RunnerSpec::new("nordic-runner")
                .external_id(42)
                .capabilities(["docker", "shell", "nordic"])
                .tags(["docker-any", "nordic"])
                .cost_per_minute(0.01)
                .external_tag("gitlab-runner-nordic"),
        );
        onto.add_runner(
            RunnerSpec::new("mac-local")
                .capabilities(["shell", "macos", "xcode"])
                .online(false),
        );
        onto
    }

    #[test]
    fn snapshot_lists_closed_capabilities() {
        let snap = sample().to_snapshot();
        let nordic = &snap.runners["nordic-runner"];

        assert!(nordic.capabilities.contains(&"linux".to_string()));
        assert!(nordic.capabilities.contains(&"cloud".to_string()));
        assert_eq!(nordic.external_id, Some(42));
        assert!(snap.capabilities.contains(&"xcode".to_string()));
    }

    #[test]
    fn json_roundtrip_preserves_runners() {
        let onto = sample();
        let json = onto.to_json().unwrap();
        let back = Ontology::from_json(&json).unwrap();

        assert_eq!(back.to_snapshot(), onto.to_snapshot());
        assert!(!back.runner("mac-local").unwrap().is_online());
        assert_eq!(
            back.resolve_external_tag("gitlab-runner-nordic"),
            Some("nordic-runner")
        );
        assert_eq!(
            back.capability("xcode").map(|c| c.category()),
            Some(CapabilityType::Custom)
        );
    }

    #[test]
    fn restore_rederives_closure() {
        let json = r#"{"runners": {"r1": {"capabilities": ["docker"]}}}"#;
        let onto = Ontology::from_json(json).unwrap();
        let r1 = onto.runner("r1").unwrap();

        assert!(r1.has_capability("linux"));
        assert!(r1.is_online());
        assert_eq!(r1.cost_per_minute(), 0.0);
    }

    #[test]
    fn malformed_json_is_snapshot_error() {
        let err = Ontology::from_json("{not json").unwrap_err();
        assert!(matches!(err, CoreError::Snapshot(_)));
    }
}
