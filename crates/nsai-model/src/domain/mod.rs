mod hints;
pub use hints::ResourceHints;

mod constants;
pub use constants::{
    CAP_DOCKER, DEFAULT_TIMEOUT_SECS, HINT_CPU, HINT_MEMORY, VAR_RUNNER_CPU, VAR_RUNNER_MEMORY,
};

/// Identifier of a runner inside the ontology.
///
/// Runner names are unique: registering a runner under an existing name replaces it.
pub type RunnerName = String;
