use std::collections::BTreeMap;

use nsai_model::{Capability, CapabilitySet, RunnerName};

/// Registration request for [`super::Ontology::add_runner`].
///
/// Capability names are resolved against the ontology at registration time;
/// the resulting runner holds the implication closure, not the raw list.
#[derive(Clone, Debug, PartialEq)]
pub struct RunnerSpec {
    pub name: RunnerName,
    pub external_id: Option<u64>,
    pub capabilities: Vec<String>,
    pub tags: Vec<String>,
    pub cost_per_minute: f64,
    pub online: bool,
    pub external_tag: Option<String>,
}

impl RunnerSpec {
    /// Online runner with no capabilities and zero cost.
    pub fn new(name: impl Into<RunnerName>) -> Self {
        Self {
            name: name.into(),
            external_id: None,
            capabilities: Vec::new(),
            tags: Vec::new(),
            cost_per_minute: 0.0,
            online: true,
            external_tag: None,
        }
    }

    pub fn capabilities<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = caps.into_iter().map(Into::into).collect();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn cost_per_minute(mut self, cost: f64) -> Self {
        self.cost_per_minute = cost;
        self
    }

    pub fn online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    pub fn external_id(mut self, id: u64) -> Self {
        self.external_id = Some(id);
        self
    }

    /// Name the external statistics service uses for this runner.
    pub fn external_tag(mut self, tag: impl Into<String>) -> Self {
        self.external_tag = Some(tag.into());
        self
    }
}

/// A registered execution runner.
///
/// Its capability set is closed under the ontology's implication rules.
#[derive(Clone, Debug, PartialEq)]
pub struct Runner {
    pub(super) name: RunnerName,
    pub(super) external_id: Option<u64>,
    pub(super) capabilities: BTreeMap<String, Capability>,
    pub(super) tags: Vec<String>,
    pub(super) online: bool,
    pub(super) cost_per_minute: f64,
    pub(super) external_tag: Option<String>,
}

impl Runner {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn external_id(&self) -> Option<u64> {
        self.external_id
    }

    /// Capabilities keyed by name.
    pub fn capabilities(&self) -> &BTreeMap<String, Capability> {
        &self.capabilities
    }

    /// Capability names in ascending order.
    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn cost_per_minute(&self) -> f64 {
        self.cost_per_minute
    }

    pub fn external_tag(&self) -> Option<&str> {
        self.external_tag.as_deref()
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    pub fn has_all_capabilities<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|n| self.has_capability(n.as_ref()))
    }

    pub fn has_any_capability<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.has_capability(n.as_ref()))
    }
}

impl CapabilitySet for Runner {
    fn has(&self, name: &str) -> bool {
        self.has_capability(name)
    }
}
