//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::events::DEFAULT_EVENT_LOG_CAPACITY;

/// Configuration for the transfer orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How often the auto-cycle re-checks an empty queue (milliseconds).
    /// Newly discovered items wake it immediately.
    #[serde(default = "default_auto_poll_interval")]
    pub auto_poll_interval_ms: u64,

    /// How often the auto-cycle refreshes the trending list when it was
    /// given source credentials (seconds, 0 = never).
    #[serde(default = "default_discovery_interval")]
    pub discovery_interval_secs: u64,

    /// Upper bound on a single platform call (seconds).
    /// Elapsing counts as an upstream failure.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Pause after a rate-limit or quota failure when the platform gave no
    /// retry hint (seconds).
    #[serde(default = "default_cooldown")]
    pub rate_limit_cooldown_secs: u64,

    /// Number of transfer events retained, newest first.
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,

    /// Retry policy for transient platform failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Exponential backoff for transient failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per platform call (1 = no retry).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the first retry (milliseconds). Doubles on each retry.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_auto_poll_interval() -> u64 {
    1000
}

fn default_discovery_interval() -> u64 {
    300 // 5 minutes
}

fn default_call_timeout() -> u64 {
    120
}

fn default_cooldown() -> u64 {
    60
}

fn default_event_log_capacity() -> usize {
    DEFAULT_EVENT_LOG_CAPACITY
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    10_000
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            auto_poll_interval_ms: default_auto_poll_interval(),
            discovery_interval_secs: default_discovery_interval(),
            call_timeout_secs: default_call_timeout(),
            rate_limit_cooldown_secs: default_cooldown(),
            event_log_capacity: default_event_log_capacity(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}
