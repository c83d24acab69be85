use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Free-form resource hints extracted from job variables (`cpu`, `memory`, ...).
///
/// Values are copied verbatim; the core never interprets them.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct ResourceHints(pub BTreeMap<String, String>);

impl ResourceHints {
    /// Create an empty hint map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if no hints are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of hints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert or overwrite a hint.
    pub fn insert<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), val.into());
        self
    }

    /// Get the value for a hint, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    /// Iterate through all hints as `(&str, &str)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceHints;

    #[test]
    fn insert_overwrites_and_get_reads_back() {
        let mut hints = ResourceHints::new();
        hints.insert("cpu", "2").insert("memory", "4Gi");
        hints.insert("cpu", "4");

        assert_eq!(hints.len(), 2);
        assert_eq!(hints.get("cpu"), Some("4"));
        assert_eq!(hints.get("memory"), Some("4Gi"));
        assert!(hints.get("gpu").is_none());
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut hints = ResourceHints::new();
        hints.insert("memory", "8Gi");

        let json = serde_json::to_string(&hints).unwrap();
        assert_eq!(json, r#"{"memory":"8Gi"}"#);
    }
}
