use std::collections::BTreeMap;

use nsai_model::JobSpec;
use serde_yaml::{Mapping, Value};
use tracing::{debug, trace};

use crate::error::CoreError;

/// Top-level keys of a CI document that never describe a job.
const RESERVED_KEYS: &[&str] = &[
    "default",
    "include",
    "variables",
    "stages",
    "workflow",
    "image",
    "services",
    "cache",
    "before_script",
    "after_script",
];

/// Extract job definitions from a CI document (YAML).
///
/// - keys starting with `.` (hidden templates) and reserved keywords are skipped;
/// - entries whose value is not a mapping are skipped;
/// - a job declaring no `tags` inherits `default.tags`, if the document has them.
///
/// Blank input yields no jobs. Invalid YAML or a job that does not match [`JobSpec`]
/// is reported as [`CoreError::Document`].
pub fn document_jobs(yaml: &str) -> Result<BTreeMap<String, JobSpec>, CoreError> {
    if yaml.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let doc: Mapping =
        serde_yaml::from_str(yaml).map_err(|e| CoreError::Document(e.to_string()))?;

    let default_tags = match doc.get("default") {
        Some(value @ Value::Mapping(_)) => {
            let defaults: JobSpec = serde_yaml::from_value(value.clone())
                .map_err(|e| CoreError::Document(format!("default: {e}")))?;
            defaults.tags
        }
        _ => None,
    };

    let mut jobs = BTreeMap::new();
    for (key, value) in doc {
        let Value::String(name) = key else {
            continue;
        };
        if name.starts_with('.') || RESERVED_KEYS.contains(&name.as_str()) {
            trace!(key = %name, "skipping non-job key");
            continue;
        }
        if !value.is_mapping() {
            trace!(key = %name, "skipping non-mapping entry");
            continue;
        }

        let mut job: JobSpec = serde_yaml::from_value(value)
            .map_err(|e| CoreError::Document(format!("job '{name}': {e}")))?;
        if job.tags.is_none() {
            job.tags = default_tags.clone();
        }
        jobs.insert(name, job);
    }

    debug!(jobs = jobs.len(), "ci document parsed");
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JobRequirementParser;
    use nsai_model::{DEFAULT_TIMEOUT_SECS, HINT_CPU};

    const PIPELINE: &str = r#"
stages: [build, test]
variables:
  GLOBAL: "1"
image: alpine:3.19
default:
  tags: [docker-any]
.template:
  tags: [shell]
build:
  stage: build
  image: python:3.11
  script: [make]
test-macos:
  stage: test
  tags: [macos]
  script: [make test]
train:
  image: nvidia/cuda:11.8
  tags: [gpu]
  timeout: 2h
"#;

    #[test]
    fn skips_templates_and_reserved_keys() {
        let jobs = document_jobs(PIPELINE).unwrap();
        let names: Vec<&str> = jobs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["build", "test-macos", "train"]);
    }

    #[test]
    fn jobs_without_tags_inherit_defaults() {
        let jobs = document_jobs(PIPELINE).unwrap();
        assert_eq!(jobs["build"].tags, Some(vec!["docker-any".to_string()]));
        assert_eq!(jobs["test-macos"].tags, Some(vec!["macos".to_string()]));
    }

    #[test]
    fn parse_document_builds_requirements_per_job() {
        let parser = JobRequirementParser::new();
        let reqs = parser.parse_document(PIPELINE).unwrap();

        assert_eq!(reqs["build"].required, vec!["docker"]);
        assert_eq!(reqs["test-macos"].required, vec!["macos", "shell"]);
        assert_eq!(reqs["train"].required, vec!["gpu", "docker"]);
        assert_eq!(reqs["train"].preferred, vec!["gpu"]);
        assert_eq!(reqs["train"].timeout_secs, Some(7200));
        assert_eq!(reqs["train"].job_name, "train");
    }

    #[test]
    fn odd_scalar_shapes_do_not_reject_the_document() {
        let yaml = r#"
build:
  tags: [docker]
  timeout: 1.5
  variables:
    CI_RUNNER_CPU: {value: 4}
deploy:
  tags: [shell]
  timeout: -30
"#;
        let parser = JobRequirementParser::new();
        let reqs = parser.parse_document(yaml).unwrap();

        assert_eq!(reqs["build"].timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(reqs["deploy"].timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(reqs["build"].resource_hints.get(HINT_CPU), Some("4"));
    }

    #[test]
    fn document_without_defaults_leaves_tags_absent() {
        let jobs = document_jobs("lint:\n  script: [cargo clippy]\n").unwrap();
        assert!(jobs["lint"].tags.is_none());
    }

    #[test]
    fn blank_document_has_no_jobs() {
        assert!(document_jobs("").unwrap().is_empty());
        assert!(document_jobs("  \n").unwrap().is_empty());
    }

    #[test]
    fn invalid_documents_are_errors() {
        assert!(matches!(
            document_jobs("- just\n- a list\n"),
            Err(CoreError::Document(_))
        ));
        assert!(matches!(
            document_jobs("job:\n  tags: {bad: shape}\n"),
            Err(CoreError::Document(msg)) if msg.contains("job")
        ));
    }
}
