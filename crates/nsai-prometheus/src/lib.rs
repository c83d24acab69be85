//! Prometheus backend for runner selection metrics.
//!
//! [`PrometheusMetrics`] implements [`nsai_core::MetricsBackend`]; attach it with
//! [`nsai_core::Selector::with_metrics`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use nsai_core::prelude::*;
//! use nsai_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let solver = ConstraintSolver::new(Ontology::new(), JobRequirementParser::new());
//! let selector = Selector::new(solver, 2.0).with_metrics(Arc::new(metrics.clone()));
//!
//! let text = metrics.encode_text()?;
//! # let _ = (selector, text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `nsai_solves_total{status}` - Counter
//! - `nsai_solve_duration_seconds` - Histogram
//! - `nsai_selections_total{runner, mode}` - Counter
//! - `nsai_outcomes_total{runner, outcome}` - Counter
//! - `nsai_job_duration_seconds{runner}` - Histogram
//!
//! No HTTP server is provided; serve [`PrometheusMetrics::encode_text`] from whatever the
//! embedding service already runs.
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
