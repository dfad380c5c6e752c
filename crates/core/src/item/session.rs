//! Per-session credentials.
//!
//! Credentials are supplied by the caller on every request and never written
//! to disk. `Debug` output redacts the secret.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Credentials for the source platform (an API key).
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceCredentials {
    pub api_key: String,
}

impl SourceCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Reject blank keys before any upstream call.
    pub fn validate(&self) -> Result<(), PlatformError> {
        if self.api_key.trim().is_empty() {
            return Err(PlatformError::InvalidInput(
                "source API key is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Credentials for the destination platform (an access token).
#[derive(Clone, Serialize, Deserialize)]
pub struct DestinationCredentials {
    pub access_token: String,
}

impl DestinationCredentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn validate(&self) -> Result<(), PlatformError> {
        if self.access_token.trim().is_empty() {
            return Err(PlatformError::InvalidInput(
                "destination access token is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for DestinationCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationCredentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Credentials handed to the auto-cycle for the duration of one run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// When present the auto-cycle also refreshes the trending list.
    pub source: Option<SourceCredentials>,
    pub destination: DestinationCredentials,
}

impl SessionConfig {
    pub fn new(destination: DestinationCredentials) -> Self {
        Self {
            source: None,
            destination,
        }
    }

    pub fn with_source(mut self, source: SourceCredentials) -> Self {
        self.source = Some(source);
        self
    }
}
