//! # Observability & Tracing
//!
//! Two things live here:
//!
//! - [`setup_tracing`] initializes structured logging with the `tracing` crate. The compact
//!   format hides the crate/module prefix (`with_target(false)`) and the level is controlled
//!   by `RUST_LOG`.
//! - [`TracingLogSink`] is a [`LogSink`] for hosts without a log table of their own: every
//!   [`LogEntry`] becomes a `tracing` event at the matching level, with the subject as
//!   structured fields.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Module log records only
//! RUST_LOG=info cargo run
//!
//! # Include per-request shop actor traffic
//! RUST_LOG=debug cargo run
//!
//! # Filter to the module
//! RUST_LOG=stock_guard=debug cargo run
//! ```

use crate::model::{LogEntry, Severity};
use crate::ports::LogSink;
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber. Panics if one is already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Forwards host log records to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, entry: LogEntry) {
        let subject_type = entry.subject_type.to_string();
        let subject_id = entry.subject_id.map(|id| id.get());
        match entry.severity {
            Severity::Info => {
                tracing::info!(%subject_type, ?subject_id, "{}", entry.message)
            }
            Severity::Warning => {
                tracing::warn!(%subject_type, ?subject_id, "{}", entry.message)
            }
            Severity::Error => {
                tracing::error!(%subject_type, ?subject_id, "{}", entry.message)
            }
        }
    }
}
