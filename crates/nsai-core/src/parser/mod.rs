//! Job requirement parser.
//!
//! Turns a CI job definition into [`JobRequirements`]:
//! tags become required capabilities, the image and services add soft preferences,
//! a few variables become resource hints and the timeout is normalized to seconds.
mod config;
pub use config::{ParserConfig, PatternHint};

mod document;
pub use document::document_jobs;

mod timeout;
pub use timeout::timeout_secs;

use std::collections::BTreeMap;

use nsai_model::{CAP_DOCKER, JobRequirements, JobSpec};
use tracing::trace;

/// Parser for CI job definitions.
#[derive(Debug, Clone)]
pub struct JobRequirementParser {
    tag_mappings: BTreeMap<String, Vec<String>>,
    image_hints: Vec<PatternHint>,
    service_hints: Vec<PatternHint>,
    resource_variables: BTreeMap<String, String>,
}

impl JobRequirementParser {
    /// Parser with the built-in tables.
    pub fn new() -> Self {
        Self::from_config(&ParserConfig::default())
    }

    /// Parser with the built-in tag table extended by `config`.
    pub fn from_config(config: &ParserConfig) -> Self {
        let mut parser = Self {
            tag_mappings: config::default_tag_mappings(),
            image_hints: config.image_hints.clone(),
            service_hints: config.service_hints.clone(),
            resource_variables: config.resource_variables.clone(),
        };
        for (tag, caps) in &config.tag_mappings {
            parser.add_tag_mapping(tag, caps.iter().cloned());
        }
        parser
    }

    /// Add or replace the capabilities a tag maps to.
    pub fn add_tag_mapping<I, S>(&mut self, tag: &str, capabilities: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_mappings.insert(
            tag.to_lowercase(),
            capabilities.into_iter().map(Into::into).collect(),
        );
    }

    /// Capabilities a tag maps to, if the tag is known.
    pub fn tag_mapping(&self, tag: &str) -> Option<&[String]> {
        self.tag_mappings.get(&tag.to_lowercase()).map(Vec::as_slice)
    }

    /// Extract requirements from a single job. Never fails.
    pub fn parse(&self, job: &JobSpec, job_name: &str) -> JobRequirements {
        let tags = job.tag_list().to_vec();

        let mut required: Vec<String> = Vec::new();
        for tag in &tags {
            match self.tag_mapping(tag) {
                Some(caps) => required.extend(caps.iter().cloned()),
                None => required.push(tag.to_lowercase()),
            }
        }

        let mut preferred: Vec<String> = Vec::new();
        if let Some(image) = job.image.as_deref().filter(|i| !i.trim().is_empty()) {
            required.push(CAP_DOCKER.to_string());
            for hint in self.image_hints.iter().filter(|h| h.matches(image)) {
                preferred.extend(hint.capabilities.iter().cloned());
            }
        }

        for service in &job.services {
            for hint in self.service_hints.iter().filter(|h| h.matches(service)) {
                preferred.extend(hint.capabilities.iter().cloned());
            }
        }

        let mut reqs = JobRequirements::new(job_name)
            .with_required(required)
            .with_preferred(preferred);
        reqs.tags = tags;

        for (var, hint) in &self.resource_variables {
            if let Some(value) = job.variables.get(var) {
                reqs.resource_hints.insert(hint.as_str(), value.as_str());
            }
        }

        reqs.timeout_secs = job.timeout.as_ref().and_then(timeout_secs);

        trace!(
            job = job_name,
            required = ?reqs.required,
            preferred = ?reqs.preferred,
            timeout_secs = ?reqs.timeout_secs,
            "job requirements parsed"
        );
        reqs
    }

    /// Parse every job of a CI document.
    ///
    /// See [`document_jobs`] for which keys count as jobs and how default tags are applied.
    pub fn parse_document(&self, yaml: &str) -> Result<BTreeMap<String, JobRequirements>, crate::CoreError> {
        Ok(document_jobs(yaml)?
            .into_iter()
            .map(|(name, job)| {
                let reqs = self.parse(&job, &name);
                (name, reqs)
            })
            .collect())
    }
}

impl Default for JobRequirementParser {
    fn default() -> Self {
        Self::new()
    }
}
