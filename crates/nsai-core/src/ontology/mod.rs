//! Capability ontology: the knowledge base of capabilities and runners.
//!
//! The ontology owns three registries:
//! - capabilities by name;
//! - runners by name (names are unique, re-registration replaces);
//! - external tag -> runner name (one runner per tag).
//!
//! It also carries a fixed implication table (`docker` implies `linux`, ...). A runner's
//! capability set is closed under it at registration time, so queries never need to reason
//! about implications again.
mod runner;
pub use runner::{Runner, RunnerSpec};

mod snapshot;
pub use snapshot::{OntologySnapshot, RunnerSnapshot};

mod taxonomy;

use std::collections::BTreeMap;

use nsai_model::{Capability, CapabilityType, RunnerName};
use tracing::{debug, trace, warn};

/// Registry of capabilities, runners and implication rules.
///
/// Runners are kept in ascending name order, which makes every query deterministic.
#[derive(Clone, Debug)]
pub struct Ontology {
    capabilities: BTreeMap<String, Capability>,
    runners: BTreeMap<RunnerName, Runner>,
    implications: BTreeMap<String, Vec<String>>,
    external_tags: BTreeMap<String, RunnerName>,
}

impl Ontology {
    /// Create an ontology seeded with the standard capability taxonomy.
    pub fn new() -> Self {
        let mut onto = Self::empty();
        for (name, category, description) in taxonomy::STANDARD_CAPABILITIES {
            onto.add_capability(*name, *category, *description);
        }
        onto
    }

    /// Create an ontology with no capabilities and no runners.
    ///
    /// Implication rules are still in place.
    pub fn empty() -> Self {
        let implications = taxonomy::IMPLICATIONS
            .iter()
            .map(|(from, to)| {
                (
                    from.to_string(),
                    to.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();

        Self {
            capabilities: BTreeMap::new(),
            runners: BTreeMap::new(),
            implications,
            external_tags: BTreeMap::new(),
        }
    }

    /// Register or overwrite a capability definition.
    pub fn add_capability(
        &mut self,
        name: impl Into<String>,
        category: CapabilityType,
        description: impl Into<String>,
    ) -> &Capability {
        let cap = Capability::new(name, category, description);
        let name = cap.name().to_string();
        trace!(capability = %name, category = %category, "capability defined");
        self.capabilities.insert(name.clone(), cap);
        &self.capabilities[&name]
    }

    /// Register a runner, replacing any runner with the same name.
    ///
    /// Rules:
    /// - a known capability is attached together with everything it implies, transitively;
    /// - an unknown capability is created as [`CapabilityType::Custom`] and attached;
    /// - the external tag index is updated; a tag previously owned by another runner moves to this one.
    pub fn add_runner(&mut self, spec: RunnerSpec) -> &Runner {
        let capabilities = self.close_capabilities(&spec.capabilities);

        if let Some(old_tag) = self
            .runners
            .get(&spec.name)
            .and_then(|prev| prev.external_tag.clone())
        {
            if self.external_tags.get(&old_tag) == Some(&spec.name) {
                self.external_tags.remove(&old_tag);
            }
        }

        if let Some(tag) = &spec.external_tag {
            if let Some(prev_owner) = self.external_tags.insert(tag.clone(), spec.name.clone()) {
                if prev_owner != spec.name {
                    warn!(tag = %tag, from = %prev_owner, to = %spec.name, "external tag reassigned");
                    if let Some(prev) = self.runners.get_mut(&prev_owner) {
                        prev.external_tag = None;
                    }
                }
            }
        }

        debug!(
            runner = %spec.name,
            capabilities = capabilities.len(),
            online = spec.online,
            cost_per_minute = spec.cost_per_minute,
            "runner registered"
        );

        let name = spec.name.clone();
        let runner = Runner {
            name: spec.name,
            external_id: spec.external_id,
            capabilities,
            tags: spec.tags,
            online: spec.online,
            cost_per_minute: spec.cost_per_minute,
            external_tag: spec.external_tag,
        };
        self.runners.insert(name.clone(), runner);
        &self.runners[&name]
    }

    /// Resolve capability names into their implication closure.
    ///
    /// Every name is visited once, so cycles in the implication table cannot loop.
    fn close_capabilities(&mut self, names: &[String]) -> BTreeMap<String, Capability> {
        let mut closed = BTreeMap::new();
        let mut pending: Vec<String> = names.iter().rev().cloned().collect();

        while let Some(name) = pending.pop() {
            if closed.contains_key(&name) {
                continue;
            }
            let cap = self
                .capabilities
                .entry(name.clone())
                .or_insert_with(|| {
                    debug!(capability = %name, "unknown capability, created as custom");
                    Capability::custom(name.clone())
                })
                .clone();
            closed.insert(name.clone(), cap);

            if let Some(implied) = self.implications.get(&name) {
                pending.extend(
                    implied
                        .iter()
                        .rev()
                        .filter(|i| !closed.contains_key(*i))
                        .cloned(),
                );
            }
        }
        closed
    }

    /// Runners that are online (unless `include_offline`), have every `required`
    /// capability and none of the `excluded` ones.
    ///
    /// Empty `required`/`excluded` lists match every eligible runner.
    pub fn feasible_runners<R, E>(
        &self,
        required: &[R],
        excluded: &[E],
        include_offline: bool,
    ) -> Vec<&Runner>
    where
        R: AsRef<str>,
        E: AsRef<str>,
    {
        self.runners
            .values()
            .filter(|r| include_offline || r.online)
            .filter(|r| r.has_all_capabilities(required))
            .filter(|r| !r.has_any_capability(excluded))
            .collect()
    }

    /// All runners having the given capability, online or not.
    pub fn runners_with_capability(&self, name: &str) -> Vec<&Runner> {
        self.runners
            .values()
            .filter(|r| r.has_capability(name))
            .collect()
    }

    /// All runners having every given capability, online or not.
    pub fn runners_with_all_capabilities<S: AsRef<str>>(&self, names: &[S]) -> Vec<&Runner> {
        self.runners
            .values()
            .filter(|r| r.has_all_capabilities(names))
            .collect()
    }

    /// Runner name registered for an external statistics tag.
    pub fn resolve_external_tag(&self, tag: &str) -> Option<&str> {
        self.external_tags.get(tag).map(String::as_str)
    }

    /// External statistics tag of a runner.
    pub fn external_tag_for(&self, runner: &str) -> Option<&str> {
        self.runners.get(runner).and_then(Runner::external_tag)
    }

    pub fn runner(&self, name: &str) -> Option<&Runner> {
        self.runners.get(name)
    }

    /// Runners in ascending name order.
    pub fn runners(&self) -> impl Iterator<Item = &Runner> {
        self.runners.values()
    }

    /// Runner names in ascending order.
    pub fn runner_names(&self) -> impl Iterator<Item = &str> {
        self.runners.keys().map(String::as_str)
    }

    pub fn contains_runner(&self, name: &str) -> bool {
        self.runners.contains_key(name)
    }

    pub fn capability(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    /// Capabilities in ascending name order.
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.values()
    }

    /// Capabilities directly implied by `name` (not transitively).
    pub fn implied_by(&self, name: &str) -> &[String] {
        self.implications
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of registered runners.
    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}

impl Default for Ontology {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(runners: Vec<&Runner>) -> Vec<&str> {
        runners.into_iter().map(Runner::name).collect()
    }

    #[test]
    fn standard_taxonomy_is_seeded() {
        let onto = Ontology::new();
        assert_eq!(
            onto.capability("docker").map(Capability::category),
            Some(CapabilityType::Executor)
        );
        assert_eq!(
            onto.capability("gpu").map(Capability::category),
            Some(CapabilityType::Hardware)
        );
        assert!(onto.is_empty());

        let empty = Ontology::empty();
        assert!(empty.capability("docker").is_none());
        assert_eq!(empty.implied_by("docker"), ["linux"]);
    }

    #[test]
    fn add_capability_overwrites_definition() {
        let mut onto = Ontology::new();
        onto.add_capability("gpu", CapabilityType::Custom, "repurposed");

        let cap = onto.capability("gpu").unwrap();
        assert_eq!(cap.category(), CapabilityType::Custom);
        assert_eq!(cap.description(), "repurposed");
    }

    #[test]
    fn implications_are_closed_transitively() {
        let mut onto = Ontology::new();
        let runner = onto.add_runner(RunnerSpec::new("nordic-runner").capabilities(["nordic"]));

        let caps: Vec<&str> = runner.capability_names().collect();
        assert_eq!(caps, vec!["cloud", "eu-west", "gcp", "nordic"]);
    }

    #[test]
    fn re_registering_does_not_grow_capabilities() {
        let mut onto = Ontology::new();
        let spec = RunnerSpec::new("r1").capabilities(["docker", "gcp"]);

        let first = onto.add_runner(spec.clone()).capabilities().len();
        let second = onto.add_runner(spec).capabilities().len();

        assert_eq!(first, 4); // docker, linux, gcp, cloud
        assert_eq!(first, second);
        assert_eq!(onto.len(), 1);
    }

    #[test]
    fn unknown_capability_becomes_custom() {
        let mut onto = Ontology::new();
        onto.add_runner(RunnerSpec::new("r1").capabilities(["fpga"]));

        assert_eq!(
            onto.capability("fpga").map(Capability::category),
            Some(CapabilityType::Custom)
        );
        assert!(onto.runner("r1").unwrap().has_capability("fpga"));
    }

    #[test]
    fn unknown_implied_capability_is_created_in_empty_ontology() {
        let mut onto = Ontology::empty();
        let runner = onto.add_runner(RunnerSpec::new("r1").capabilities(["docker"]));

        assert!(runner.has_capability("linux"));
        assert_eq!(
            onto.capability("linux").map(Capability::category),
            Some(CapabilityType::Custom)
        );
    }

    #[test]
    fn feasible_runners_filters_online_required_and_excluded() {
        let mut onto = Ontology::new();
        onto.add_runner(RunnerSpec::new("a").capabilities(["docker"]));
        onto.add_runner(RunnerSpec::new("b").capabilities(["docker", "gpu"]));
        onto.add_runner(RunnerSpec::new("c").capabilities(["docker"]).online(false));
        onto.add_runner(RunnerSpec::new("d").capabilities(["shell", "macos"]));

        let none: [&str; 0] = [];
        assert_eq!(names(onto.feasible_runners(&none, &none, false)), vec!["a", "b", "d"]);
        assert_eq!(
            names(onto.feasible_runners(&["docker"], &none, false)),
            vec!["a", "b"]
        );
        assert_eq!(
            names(onto.feasible_runners(&["docker"], &["gpu"], false)),
            vec!["a"]
        );
        assert_eq!(
            names(onto.feasible_runners(&["linux"], &none, true)),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn capability_queries_ignore_online_flag() {
        let mut onto = Ontology::new();
        onto.add_runner(RunnerSpec::new("a").capabilities(["docker"]).online(false));
        onto.add_runner(RunnerSpec::new("b").capabilities(["shell"]));

        assert_eq!(names(onto.runners_with_capability("linux")), vec!["a"]);
        assert_eq!(
            names(onto.runners_with_all_capabilities(&["docker", "linux"])),
            vec!["a"]
        );
        assert!(onto.runners_with_capability("gpu").is_empty());
    }

    #[test]
    fn external_tags_resolve_both_ways() {
        let mut onto = Ontology::new();
        onto.add_runner(
            RunnerSpec::new("nordic-runner")
                .capabilities(["docker"])
                .external_tag("gitlab-runner-nordic"),
        );

        assert_eq!(
            onto.resolve_external_tag("gitlab-runner-nordic"),
            Some("nordic-runner")
        );
        assert_eq!(
            onto.external_tag_for("nordic-runner"),
            Some("gitlab-runner-nordic")
        );
        assert!(onto.resolve_external_tag("unknown").is_none());
        assert!(onto.external_tag_for("unknown").is_none());
    }

    #[test]
    fn external_tag_moves_to_latest_owner() {
        let mut onto = Ontology::new();
        onto.add_runner(RunnerSpec::new("old").external_tag("shared"));
        onto.add_runner(RunnerSpec::new("new").external_tag("shared"));

        assert_eq!(onto.resolve_external_tag("shared"), Some("new"));
        assert!(onto.external_tag_for("old").is_none());
    }

    #[test]
    fn re_registering_with_new_tag_drops_stale_mapping() {
        let mut onto = Ontology::new();
        onto.add_runner(RunnerSpec::new("r1").external_tag("t1"));
        onto.add_runner(RunnerSpec::new("r1").external_tag("t2"));

        assert!(onto.resolve_external_tag("t1").is_none());
        assert_eq!(onto.resolve_external_tag("t2"), Some("r1"));
    }

    #[test]
    fn runners_iterate_in_name_order() {
        let mut onto = Ontology::new();
        for name in ["zeta", "alpha", "mid"] {
            onto.add_runner(RunnerSpec::new(name));
        }
        let order: Vec<&str> = onto.runner_names().collect();
        assert_eq!(order, vec!["alpha", "mid", "zeta"]);
    }
}
