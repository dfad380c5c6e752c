//! Error taxonomy shared by both platform clients.
//!
//! Every failure a client can produce maps onto exactly one [`ErrorKind`].
//! The orchestrator and the HTTP layer only ever reason about kinds; raw
//! transport errors never escape this module.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a platform failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller supplied malformed or missing input. Never retried.
    InvalidInput,
    /// Credentials invalid or expired. Surfaced for re-entry, never retried.
    Auth,
    /// Source platform quota or rate limit hit. Retry only after a cooldown.
    RateLimited,
    /// Destination platform quota hit. Retry only after a cooldown.
    QuotaExceeded,
    /// The source asset no longer resolves. Terminal for the item.
    NotFound,
    /// The destination rejected the asset (wrong format, too large...).
    Rejected,
    /// Transient network or server fault, including timeouts.
    Upstream,
    /// Unexpected fault.
    Internal,
}

impl ErrorKind {
    /// Whether an automatic retry with backoff is allowed.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Upstream)
    }

    /// Whether this kind asks the caller to back off before the next call.
    pub fn needs_cooldown(self) -> bool {
        matches!(self, ErrorKind::RateLimited | ErrorKind::QuotaExceeded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the source and destination clients.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Missing or malformed input (no API key, unparsable locator...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Upstream refused the credentials (401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Source platform rate limit or quota exhausted.
    #[error("rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Destination platform quota exhausted.
    #[error("quota exceeded: {message}")]
    QuotaExceeded {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Resource not found upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// Asset rejected by the destination.
    #[error("asset rejected: {0}")]
    Rejected(String),

    /// Transient upstream failure.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Unexpected fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlatformError::InvalidInput(_) => ErrorKind::InvalidInput,
            PlatformError::Auth(_) => ErrorKind::Auth,
            PlatformError::RateLimited { .. } => ErrorKind::RateLimited,
            PlatformError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            PlatformError::NotFound(_) => ErrorKind::NotFound,
            PlatformError::Rejected(_) => ErrorKind::Rejected,
            PlatformError::Upstream(_) => ErrorKind::Upstream,
            PlatformError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Cooldown hint carried by rate-limit and quota errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            PlatformError::RateLimited { retry_after, .. }
            | PlatformError::QuotaExceeded { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// The detail message without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            PlatformError::InvalidInput(m)
            | PlatformError::Auth(m)
            | PlatformError::NotFound(m)
            | PlatformError::Rejected(m)
            | PlatformError::Upstream(m)
            | PlatformError::Internal(m) => m,
            PlatformError::RateLimited { message, .. }
            | PlatformError::QuotaExceeded { message, .. } => message,
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PlatformError::Upstream(format!("request timed out: {}", e))
        } else if e.is_builder() {
            PlatformError::Internal(format!("failed to build request: {}", e))
        } else {
            PlatformError::Upstream(e.to_string())
        }
    }
}

/// Parse a `Retry-After` header value given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
