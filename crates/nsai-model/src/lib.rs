mod domain;
pub use domain::{
    CAP_DOCKER, DEFAULT_TIMEOUT_SECS, HINT_CPU, HINT_MEMORY, ResourceHints, RunnerName,
    VAR_RUNNER_CPU, VAR_RUNNER_MEMORY,
};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::{Capability, CapabilitySet, CapabilityType};

mod spec;
pub use spec::{JobRequirements, JobSpec, Timeout};

mod api;
pub use api::ExternalRunnerStats;
