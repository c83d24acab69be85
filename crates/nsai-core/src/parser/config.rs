use std::collections::BTreeMap;

use nsai_model::{HINT_CPU, HINT_MEMORY, VAR_RUNNER_CPU, VAR_RUNNER_MEMORY};
use serde::{Deserialize, Serialize};

/// Substring rule: if any pattern occurs in the inspected text, the capabilities apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternHint {
    pub patterns: Vec<String>,
    pub capabilities: Vec<String>,
}

impl PatternHint {
    pub fn new(patterns: &[&str], capabilities: &[&str]) -> Self {
        Self {
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
            capabilities: capabilities.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Case-insensitive substring match against any pattern.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_ascii_lowercase();
        self.patterns
            .iter()
            .any(|p| text.contains(&p.to_ascii_lowercase()))
    }
}

/// Requirement parser configuration.
///
/// `tag_mappings` is merged over the built-in tag table (keys are lower-cased);
/// the other tables replace their built-in counterparts when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Extra or overriding `tag -> capabilities` mappings.
    pub tag_mappings: BTreeMap<String, Vec<String>>,
    /// Image substring rules producing preferred capabilities.
    pub image_hints: Vec<PatternHint>,
    /// Service substring rules producing preferred capabilities.
    pub service_hints: Vec<PatternHint>,
    /// `job variable -> resource hint key` table.
    pub resource_variables: BTreeMap<String, String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tag_mappings: BTreeMap::new(),
            image_hints: default_image_hints(),
            service_hints: default_service_hints(),
            resource_variables: default_resource_variables(),
        }
    }
}

/// Built-in `tag -> capabilities` table.
pub(crate) fn default_tag_mappings() -> BTreeMap<String, Vec<String>> {
    const TABLE: &[(&str, &[&str])] = &[
        ("docker-any", &["docker"]),
        ("docker", &["docker"]),
        ("shell", &["shell"]),
        ("kubernetes", &["kubernetes"]),
        ("k8s", &["kubernetes"]),
        ("gcp", &["gcp"]),
        ("aws", &["aws"]),
        ("azure", &["azure"]),
        ("gpu", &["gpu"]),
        ("nordic", &["nordic", "gcp"]),
        ("macos", &["macos", "shell"]),
        ("windows", &["windows"]),
        ("linux", &["linux"]),
        ("arm64", &["arm64"]),
        ("local", &["local"]),
    ];

    TABLE
        .iter()
        .map(|(tag, caps)| {
            (
                tag.to_string(),
                caps.iter().map(|c| c.to_string()).collect(),
            )
        })
        .collect()
}

fn default_image_hints() -> Vec<PatternHint> {
    vec![
        PatternHint::new(&["nvidia", "cuda"], &["gpu"]),
        PatternHint::new(&["arm64", "aarch64"], &["arm64"]),
        PatternHint::new(&["windows"], &["windows"]),
        PatternHint::new(&["alpine", "ubuntu", "debian", "centos"], &["linux"]),
    ]
}

fn default_service_hints() -> Vec<PatternHint> {
    vec![
        PatternHint::new(&["docker:dind"], &["docker"]),
        PatternHint::new(&["postgres"], &["linux"]),
        PatternHint::new(&["mysql"], &["linux"]),
        PatternHint::new(&["redis"], &["linux"]),
        PatternHint::new(&["mongo"], &["linux"]),
    ]
}

fn default_resource_variables() -> BTreeMap<String, String> {
    BTreeMap::from([
        (VAR_RUNNER_MEMORY.to_string(), HINT_MEMORY.to_string()),
        (VAR_RUNNER_CPU.to_string(), HINT_CPU.to_string()),
    ])
}
