//! Error handling for the session gate.
//!
//! Follows the platform error conventions:
//! - Non-exhaustive enum for forward compatibility
//! - Retryability helpers so callers can distinguish transient failures
//! - Sanitization of sensitive values before messages leave the crate
//!
//! Note the asymmetry baked into the design: the edge gate never produces
//! an error (every input maps to a decision), while the identity store
//! surfaces backend failures to its callers and the route guard maps every
//! failure to a redirect.

use std::time::Duration;
use thiserror::Error;

/// Sensitive patterns that must never appear in surfaced error messages.
const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "secret",
    "token",
    "credential",
    "bearer",
    "authorization",
];

/// Default retry hint attached to transient backend failures.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Errors surfaced by the identity store and its collaborators.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GateError {
    /// Login rejected by the identity backend. User-correctable; no local
    /// state is written.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Identity backend unreachable or failing. Transient; no local state
    /// is written or cleared.
    #[error("Identity service unavailable")]
    ServiceUnavailable {
        /// Suggested retry duration
        retry_after: Duration,
    },

    /// Durable session storage failed
    #[error("Session storage error: {reason}")]
    Storage {
        /// Description of the storage failure
        reason: String,
    },

    /// Backend returned a response the client cannot interpret
    #[error("Malformed backend response: {reason}")]
    MalformedResponse {
        /// Description of the malformation (sanitized)
        reason: String,
    },

    /// Internal error (details sanitized before surfacing)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GateError {
    /// Shorthand for a storage failure.
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: sanitize_message(&reason.into()),
        }
    }

    /// Shorthand for a transient backend failure with the default retry hint.
    #[must_use]
    pub fn service_unavailable() -> Self {
        Self::ServiceUnavailable {
            retry_after: DEFAULT_RETRY_AFTER,
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }

    /// Get retry-after duration if applicable
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::ServiceUnavailable { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Sanitize a message by replacing anything that mentions credential material.
pub(crate) fn sanitize_message(message: &str) -> String {
    let lower = message.to_lowercase();
    for pattern in SENSITIVE_PATTERNS {
        if lower.contains(pattern) {
            return "Sensitive details redacted".to_string();
        }
    }
    message.to_string()
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return GateError::service_unavailable();
        }
        if let Some(status) = err.status() {
            if status.is_server_error() {
                return GateError::service_unavailable();
            }
        }
        GateError::MalformedResponse {
            reason: sanitize_message(&err.to_string()),
        }
    }
}

impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        GateError::MalformedResponse {
            reason: sanitize_message(&err.to_string()),
        }
    }
}

impl From<std::io::Error> for GateError {
    fn from(err: std::io::Error) -> Self {
        GateError::storage(err.to_string())
    }
}
