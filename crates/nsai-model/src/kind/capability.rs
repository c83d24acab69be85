use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Category a capability belongs to.
///
/// Categories are descriptive only: the solver matches capabilities by name.
/// Capabilities created implicitly (unknown runner capabilities or unmapped tags) are `Custom`.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum CapabilityType {
    /// How jobs are executed: docker, shell, kubernetes.
    Executor,
    /// Operating system: linux, macos, windows.
    Platform,
    /// Cloud provider: gcp, aws, azure.
    Cloud,
    /// Hardware traits: gpu, arm64, x86_64.
    Hardware,
    /// Placement and connectivity: regions, vpn.
    Network,
    /// User-defined capability.
    #[default]
    Custom,
}

impl CapabilityType {
    /// Returns the category as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityType::Executor => "executor",
            CapabilityType::Platform => "platform",
            CapabilityType::Cloud => "cloud",
            CapabilityType::Hardware => "hardware",
            CapabilityType::Network => "network",
            CapabilityType::Custom => "custom",
        }
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityType {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "executor" => Ok(CapabilityType::Executor),
            "platform" | "os" => Ok(CapabilityType::Platform),
            "cloud" => Ok(CapabilityType::Cloud),
            "hardware" | "hw" => Ok(CapabilityType::Hardware),
            "network" | "region" => Ok(CapabilityType::Network),
            "custom" | "" => Ok(CapabilityType::Custom),
            other => Err(ModelError::UnknownCapabilityType(other.to_string())),
        }
    }
}

/// A named trait a runner may possess (e.g. `docker`, `gpu`, `linux`).
///
/// Identity is the name. A capability is never mutated after creation;
/// redefining it in the ontology replaces the whole value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    name: String,
    category: CapabilityType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
}

impl Capability {
    pub fn new(
        name: impl Into<String>,
        category: CapabilityType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description: description.into(),
        }
    }

    /// Capability created on the fly for a name the ontology has never seen.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name, CapabilityType::Custom, "")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> CapabilityType {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Anything that can answer "is this capability present?".
///
/// Lets requirement predicates run against plain name sets as well as a runner's
/// capability map without copying.
pub trait CapabilitySet {
    fn has(&self, name: &str) -> bool;
}

impl CapabilitySet for BTreeSet<String> {
    fn has(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl CapabilitySet for HashSet<String> {
    fn has(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<V> CapabilitySet for BTreeMap<String, V> {
    fn has(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl CapabilitySet for [&str] {
    fn has(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

impl CapabilitySet for [String] {
    fn has(&self, name: &str) -> bool {
        self.iter().any(|c| c == name)
    }
}

impl<T: CapabilitySet + ?Sized> CapabilitySet for &T {
    fn has(&self, name: &str) -> bool {
        (**self).has(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_categories_case_insensitive() {
        assert_eq!(
            CapabilityType::from_str("Executor").unwrap(),
            CapabilityType::Executor
        );
        assert_eq!(
            CapabilityType::from_str(" HARDWARE ").unwrap(),
            CapabilityType::Hardware
        );
        assert_eq!(
            CapabilityType::from_str("region").unwrap(),
            CapabilityType::Network
        );
        assert_eq!(CapabilityType::from_str("").unwrap(), CapabilityType::Custom);
    }

    #[test]
    fn rejects_unknown_category() {
        let err = CapabilityType::from_str("quantum").unwrap_err();
        assert!(matches!(err, ModelError::UnknownCapabilityType(ref s) if s == "quantum"));
    }

    #[test]
    fn display_matches_as_str() {
        for cat in [
            CapabilityType::Executor,
            CapabilityType::Platform,
            CapabilityType::Cloud,
            CapabilityType::Hardware,
            CapabilityType::Network,
            CapabilityType::Custom,
        ] {
            assert_eq!(cat.to_string(), cat.as_str());
            assert_eq!(CapabilityType::from_str(cat.as_str()).unwrap(), cat);
        }
    }

    #[test]
    fn custom_capability_has_no_description() {
        let cap = Capability::custom("fpga");
        assert_eq!(cap.name(), "fpga");
        assert_eq!(cap.category(), CapabilityType::Custom);
        assert!(cap.description().is_empty());
    }

    #[test]
    fn capability_set_impls_agree() {
        let names = ["docker", "linux"];
        let set: BTreeSet<String> = names.iter().map(|s| s.to_string()).collect();
        let owned: Vec<String> = names.iter().map(|s| s.to_string()).collect();

        assert!(set.has("docker"));
        assert!(names[..].has("linux"));
        assert!(owned[..].has("docker"));
        assert!(!set.has("gpu"));
        assert!(!names[..].has("gpu"));
    }

    #[test]
    fn serde_uses_camel_case_category() {
        let cap = Capability::new("gpu", CapabilityType::Hardware, "CUDA capable");
        let json = serde_json::to_string(&cap).unwrap();
        assert!(json.contains(r#""category":"hardware""#));

        let back: Capability = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cap);
    }
}
