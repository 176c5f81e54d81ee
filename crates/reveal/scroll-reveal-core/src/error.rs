//! Error types surfaced by the controller and its hosts.

use thiserror::Error;

/// Failures reported by a [`PageHost`](crate::host::PageHost) implementation.
///
/// These represent a missing or broken host primitive. The controller does not
/// attempt to recover from them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host primitive unavailable: {0}")]
    Unsupported(String),
    #[error("selector `{selector}` rejected by host: {message}")]
    Selector { selector: String, message: String },
    #[error("host call failed: {0}")]
    Call(String),
}

/// Errors produced by the reveal controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RevealError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("reveal controller already started")]
    AlreadyStarted,
    #[error(transparent)]
    Host(#[from] HostError),
}
