//! Error types for the checking engine.
//!
//! Every per-target failure stays inside its job; only [`CycleError`] is
//! allowed to end a cycle early.

use thiserror::Error;

use crate::monitoring::transition::TransitionReport;

/// A target that can never be probed as configured.
///
/// Raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("malformed target URL {url}: {reason}")]
    Malformed { url: String, reason: String },
    #[error("only HTTPS URLs are supported, got scheme `{scheme}` in {url}")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("target URL {0} has no host")]
    MissingHost(String),
}

/// Failure below the HTTP layer (DNS, connect, TLS, timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), timed_out: false }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self { message: message.into(), timed_out: true }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display stops at the outermost layer; keep the causes
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message, timed_out: err.is_timeout() }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("status store unavailable: {0}")]
    Backend(String),
    #[error("unreadable status record for {key}: {value:?}")]
    Corrupt { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry query failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier is not configured: {0}")]
    Config(String),
    #[error("invalid recipient {recipient}: {reason}")]
    Recipient { recipient: String, reason: String },
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Result of a single job that the pool logs but never propagates.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    InvalidTarget(#[from] TargetError),
    #[error("service is down: {detail}")]
    ServiceDown { url: String, detail: String, report: TransitionReport },
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("could not enumerate subscribers: {0}")]
    Registry(#[from] RegistryError),
    #[error("cycle cancelled before the queue drained")]
    Cancelled,
}
