//! Logging setup for nsai binaries.
//!
//! Libraries in this workspace only emit `tracing` events; a binary calls [`init_logger`] once
//! to decide where they go.
mod logger;
pub use logger::*;
