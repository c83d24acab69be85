use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{CapabilitySet, ResourceHints};

/// Structured requirements extracted from a single CI job.
///
/// Hard constraints are `required` (all must be present) and `excluded` (none may be present).
/// `preferred` is a soft signal used only for ranking feasible runners.
///
/// `required` and `preferred` are deduplicated and keep first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct JobRequirements {
    /// Name of the CI job these requirements were derived from.
    pub job_name: String,
    /// Capabilities a runner must have.
    pub required: Vec<String>,
    /// Capabilities a runner should have.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred: Vec<String>,
    /// Capabilities a runner must not have.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<String>,
    /// Resource hints copied from recognized job variables.
    #[serde(default, skip_serializing_if = "ResourceHints::is_empty")]
    pub resource_hints: ResourceHints,
    /// Maximum job duration in seconds, if the job declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Raw tags the requirements were derived from.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JobRequirements {
    /// Create empty requirements for the given job.
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            ..Default::default()
        }
    }

    /// Add required capabilities, skipping ones already present.
    pub fn with_required<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.required, caps);
        self
    }

    /// Add preferred capabilities, skipping ones already present.
    pub fn with_preferred<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.preferred, caps);
        self
    }

    /// Add excluded capabilities, skipping ones already present.
    pub fn with_excluded<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.excluded, caps);
        self
    }

    /// All required capabilities present and no excluded capability present.
    pub fn is_feasible_for<C: CapabilitySet + ?Sized>(&self, caps: &C) -> bool {
        self.required.iter().all(|c| caps.has(c)) && !self.excluded.iter().any(|c| caps.has(c))
    }

    /// Fraction of preferred capabilities present, in `[0.0, 1.0]`.
    ///
    /// Exactly `1.0` when nothing is preferred.
    pub fn preference_score<C: CapabilitySet + ?Sized>(&self, caps: &C) -> f64 {
        if self.preferred.is_empty() {
            return 1.0;
        }
        let matched = self.preferred.iter().filter(|c| caps.has(c)).count();
        matched as f64 / self.preferred.len() as f64
    }

    /// Required capabilities the given set lacks, in requirement order.
    pub fn missing<'a, C: CapabilitySet + ?Sized>(&'a self, caps: &C) -> Vec<&'a str> {
        self.required
            .iter()
            .filter(|c| !caps.has(c))
            .map(String::as_str)
            .collect()
    }

    /// Excluded capabilities the given set has, in requirement order.
    pub fn forbidden<'a, C: CapabilitySet + ?Sized>(&'a self, caps: &C) -> Vec<&'a str> {
        self.excluded
            .iter()
            .filter(|c| caps.has(c))
            .map(String::as_str)
            .collect()
    }
}

/// Push every new item, keeping first-seen order.
fn extend_unique<I, S>(dst: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for item in items {
        let item = item.into();
        if !dst.contains(&item) {
            dst.push(item);
        }
    }
}
