use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::destination::{HttpPublisherConfig, SimulatedPublisherConfig};
use crate::orchestrator::{OrchestratorConfig, RetryConfig};
use crate::source::YouTubeConfig;

/// Root configuration
///
/// No section holds secrets: platform credentials are supplied per session.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Source platform configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub backend: SourceBackend,
    #[serde(flatten)]
    pub youtube: YouTubeConfig,
}

/// Available source backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceBackend {
    #[default]
    Youtube,
}

impl SourceBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceBackend::Youtube => "youtube",
        }
    }
}

/// Destination platform configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DestinationConfig {
    #[serde(default)]
    pub backend: DestinationBackend,
    /// Content API base URL (required when backend = "http")
    #[serde(default)]
    pub base_url: Option<String>,
    /// Publish request timeout in seconds (default: 120)
    #[serde(default = "default_destination_timeout")]
    pub timeout_secs: u64,
    /// Artificial publish latency for the simulated backend (default: 3000)
    #[serde(default = "default_simulated_delay")]
    pub simulated_delay_ms: u64,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            backend: DestinationBackend::default(),
            base_url: None,
            timeout_secs: default_destination_timeout(),
            simulated_delay_ms: default_simulated_delay(),
        }
    }
}

impl DestinationConfig {
    /// Settings for the HTTP publisher, if a base URL is configured.
    pub fn http(&self) -> Option<HttpPublisherConfig> {
        self.base_url.as_ref().map(|base_url| HttpPublisherConfig {
            base_url: base_url.clone(),
            timeout_secs: self.timeout_secs,
        })
    }

    /// Settings for the simulated publisher.
    pub fn simulated(&self) -> SimulatedPublisherConfig {
        SimulatedPublisherConfig {
            delay_ms: self.simulated_delay_ms,
            ..SimulatedPublisherConfig::default()
        }
    }
}

fn default_destination_timeout() -> u64 {
    120
}

fn default_simulated_delay() -> u64 {
    3000
}

/// Available destination backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DestinationBackend {
    /// JSON content API
    Http,
    /// Fake publisher with a fixed delay and synthetic ids
    #[default]
    Simulated,
}

impl DestinationBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            DestinationBackend::Http => "http",
            DestinationBackend::Simulated => "simulated",
        }
    }
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub source: SanitizedSourceConfig,
    pub destination: SanitizedDestinationConfig,
    pub orchestrator: SanitizedOrchestratorConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSourceConfig {
    pub backend: String,
    pub region_code: String,
    pub max_results: u32,
    pub timeout_secs: u64,
}

/// Sanitized destination config (endpoint reduced to whether one is set)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDestinationConfig {
    pub backend: String,
    pub base_url_configured: bool,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOrchestratorConfig {
    pub auto_poll_interval_ms: u64,
    pub discovery_interval_secs: u64,
    pub call_timeout_secs: u64,
    pub rate_limit_cooldown_secs: u64,
    pub event_log_capacity: usize,
    pub retry: RetryConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let destination = &config.destination;
        let orchestrator = &config.orchestrator;

        Self {
            server: config.server.clone(),
            source: SanitizedSourceConfig {
                backend: config.source.backend.as_str().to_string(),
                region_code: config.source.youtube.region_code.clone(),
                max_results: config.source.youtube.max_results,
                timeout_secs: config.source.youtube.timeout_secs,
            },
            destination: SanitizedDestinationConfig {
                backend: destination.backend.as_str().to_string(),
                base_url_configured: destination
                    .base_url
                    .as_ref()
                    .map(|url| !url.trim().is_empty())
                    .unwrap_or(false),
                timeout_secs: destination.timeout_secs,
                simulated_delay_ms: match destination.backend {
                    DestinationBackend::Simulated => Some(destination.simulated_delay_ms),
                    DestinationBackend::Http => None,
                },
            },
            orchestrator: SanitizedOrchestratorConfig {
                auto_poll_interval_ms: orchestrator.auto_poll_interval_ms,
                discovery_interval_secs: orchestrator.discovery_interval_secs,
                call_timeout_secs: orchestrator.call_timeout_secs,
                rate_limit_cooldown_secs: orchestrator.rate_limit_cooldown_secs,
                event_log_capacity: orchestrator.event_log_capacity,
                retry: orchestrator.retry.clone(),
            },
        }
    }
}
