//! Metrics collection abstraction for runner selection.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are attached to a
//! [`crate::Selector`] with [`crate::Selector::with_metrics`].
mod backend;
pub use backend::{JobOutcome, MetricsBackend, MetricsHandle};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
