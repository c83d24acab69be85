use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Declarative CI job definition consumed by the requirement parser.
///
/// Mirrors the subset of a `.gitlab-ci.yml` job that matters for runner placement.
/// Every field is optional; unknown keys (`script`, `stage`, ...) are ignored on deserialization.
///
/// Accepted shapes:
/// - `tags`: a list of strings or a single string;
/// - `image`: a string or `{ name: ... }`;
/// - `services`: a list of strings or `{ name: ... }` entries;
/// - `variables`: scalar values or `{ value: ... }` entries, all kept as strings;
/// - `timeout`: integer seconds or a duration string such as `"1h 30m"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct JobSpec {
    /// Runner tags declared by the job.
    ///
    /// `None` means the job declares no tags at all, which lets a CI document apply its default tags.
    #[serde(default, deserialize_with = "de::tags", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "schema", schemars(with = "Option<Vec<String>>"))]
    pub tags: Option<Vec<String>>,
    /// Container image the job runs in.
    #[serde(default, deserialize_with = "de::image", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub image: Option<String>,
    /// Sidecar services (`postgres:15`, `docker:dind`, ...).
    #[serde(default, deserialize_with = "de::services", skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "schema", schemars(with = "Vec<String>"))]
    pub services: Vec<String>,
    /// Job variables; only a few well-known keys become resource hints.
    #[serde(default, deserialize_with = "de::variables", skip_serializing_if = "BTreeMap::is_empty")]
    #[cfg_attr(feature = "schema", schemars(with = "BTreeMap<String, String>"))]
    pub variables: BTreeMap<String, String>,
    /// Maximum job duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Timeout>,
}

impl JobSpec {
    /// Create an empty job definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag list.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Set the container image.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Append a service dependency.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.services.push(service.into());
        self
    }

    /// Insert or overwrite a variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Declared tags, or an empty slice when the job declares none.
    pub fn tag_list(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

/// Job timeout as written in the CI document.
///
/// Interpretation into seconds is done by the parser, which never fails on malformed text.
/// Any scalar that is not a non-negative integer (`1.5`, `-30`, `true`) is kept as [`Timeout::Text`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(untagged)]
pub enum Timeout {
    /// Plain number of seconds.
    Seconds(u64),
    /// Duration text, e.g. `"90"`, `"1h 30m"`, `"45m"`.
    Text(String),
}

impl<'de> Deserialize<'de> for Timeout {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        de::Scalar::deserialize(d).map(de::Scalar::into_timeout)
    }
}

impl From<u64> for Timeout {
    fn from(secs: u64) -> Self {
        Timeout::Seconds(secs)
    }
}

impl From<&str> for Timeout {
    fn from(s: &str) -> Self {
        Timeout::Text(s.to_string())
    }
}

impl From<String> for Timeout {
    fn from(s: String) -> Self {
        Timeout::Text(s)
    }
}

/// Deserializers for the loosely-typed CI fields.
mod de {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Named {
        Plain(String),
        Detailed { name: String },
    }

    impl Named {
        fn into_name(self) -> String {
            match self {
                Named::Plain(s) => s,
                Named::Detailed { name } => name,
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Scalar {
        Str(String),
        UInt(u64),
        Int(i64),
        Float(f64),
        Bool(bool),
        Detailed { value: Box<Scalar> },
    }

    impl Scalar {
        fn into_string(self) -> String {
            match self {
                Scalar::Str(s) => s,
                Scalar::UInt(n) => n.to_string(),
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Bool(b) => b.to_string(),
                Scalar::Detailed { value } => value.into_string(),
            }
        }

        pub(super) fn into_timeout(self) -> Timeout {
            match self {
                Scalar::UInt(secs) => Timeout::Seconds(secs),
                other => Timeout::Text(other.into_string()),
            }
        }
    }

    pub(super) fn tags<'de, D>(d: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<OneOrMany>::deserialize(d)?.map(|tags| match tags {
            OneOrMany::One(tag) => vec![tag],
            OneOrMany::Many(tags) => tags,
        }))
    }

    pub(super) fn image<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Named>::deserialize(d)?.map(Named::into_name))
    }

    pub(super) fn services<'de, D>(d: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let services = Option::<Vec<Named>>::deserialize(d)?.unwrap_or_default();
        Ok(services.into_iter().map(Named::into_name).collect())
    }

    pub(super) fn variables<'de, D>(d: D) -> Result<BTreeMap<String, String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let vars = Option::<BTreeMap<String, Scalar>>::deserialize(d)?.unwrap_or_default();
        Ok(vars
            .into_iter()
            .map(|(k, v)| (k, v.into_string()))
            .collect())
    }
}
