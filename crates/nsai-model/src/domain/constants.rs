//! Well-known keys and defaults shared by the parser and the solver.
//!
//! Keeping them here avoids scattering magic strings across crates.

/// Capability required by every job that declares a container image.
pub const CAP_DOCKER: &str = "docker";

/// Job variable carrying a memory hint for the runner (e.g. `"4Gi"`).
pub const VAR_RUNNER_MEMORY: &str = "CI_RUNNER_MEMORY";

/// Job variable carrying a CPU hint for the runner (e.g. `"2"`).
pub const VAR_RUNNER_CPU: &str = "CI_RUNNER_CPU";

/// Resource hint key populated from [`VAR_RUNNER_MEMORY`].
pub const HINT_MEMORY: &str = "memory";

/// Resource hint key populated from [`VAR_RUNNER_CPU`].
pub const HINT_CPU: &str = "cpu";

/// Timeout used when a duration string cannot be understood.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;
