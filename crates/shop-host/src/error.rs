//! # Host Errors
//!
//! Every port returns an explicit `Result` instead of relying on the host to throw.
//! [`HostError`] is the single error type shared by all ports; [`InvalidProductId`]
//! covers the one piece of validation that happens before a port is ever called.

/// Errors that can occur while talking to the host platform.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Host unavailable: {0}")]
    Unavailable(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Host rejected the request: {0}")]
    Rejected(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Shop actor closed")]
    ActorClosed,
    #[error("Shop actor dropped response channel")]
    ActorDropped,
}

/// A raw product identifier that cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidProductId {
    #[error("product id is missing")]
    Missing,
    #[error("product id must be positive, got {0}")]
    NonPositive(i64),
    #[error("product id {0} is out of range")]
    OutOfRange(i64),
}
