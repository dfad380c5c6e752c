//! Simulated publisher for demos and dry runs.
//!
//! Waits a fixed delay and returns a synthetic remote id; nothing leaves the
//! process.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::DestinationClient;
use crate::error::PlatformError;
use crate::item::{AssetRef, DestinationCredentials, PublishResult};

/// Simulated publisher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedPublisherConfig {
    /// Artificial publish latency in milliseconds.
    #[serde(default = "default_delay")]
    pub delay_ms: u64,
    /// Base of the synthetic share URL.
    #[serde(default = "default_share_base")]
    pub share_base_url: String,
}

fn default_delay() -> u64 {
    3000
}

fn default_share_base() -> String {
    "https://www.tiktok.com/@user/video".to_string()
}

impl Default for SimulatedPublisherConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay(),
            share_base_url: default_share_base(),
        }
    }
}

pub struct SimulatedPublisher {
    config: SimulatedPublisherConfig,
}

impl SimulatedPublisher {
    pub fn new(config: SimulatedPublisherConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DestinationClient for SimulatedPublisher {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn publish(
        &self,
        asset: &AssetRef,
        credentials: &DestinationCredentials,
    ) -> Result<PublishResult, PlatformError> {
        if credentials.access_token.trim().is_empty() {
            return Err(PlatformError::Auth("access token is empty".to_string()));
        }

        debug!(
            "Simulating publish of {} ({} ms)",
            asset.item_id, self.config.delay_ms
        );
        tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;

        let remote_id = format!("sim_{}", Uuid::new_v4().simple());
        Ok(PublishResult {
            share_url: format!(
                "{}/{}",
                self.config.share_base_url.trim_end_matches('/'),
                remote_id
            ),
            remote_id,
            published_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn asset() -> AssetRef {
        AssetRef {
            item_id: "vid".to_string(),
            location: "https://www.youtube.com/watch?v=vid".to_string(),
            format: "mp4".to_string(),
            resolution: None,
            size_bytes: None,
            resolved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_simulated_publish_returns_synthetic_ids() {
        let publisher = SimulatedPublisher::new(SimulatedPublisherConfig {
            delay_ms: 1,
            ..Default::default()
        });

        let first = publisher
            .publish(&asset(), &DestinationCredentials::new("token"))
            .await
            .unwrap();
        let second = publisher
            .publish(&asset(), &DestinationCredentials::new("token"))
            .await
            .unwrap();

        assert!(first.remote_id.starts_with("sim_"));
        assert!(first.share_url.ends_with(&first.remote_id));
        assert_ne!(first.remote_id, second.remote_id);
    }

    #[tokio::test]
    async fn test_simulated_publish_requires_token() {
        let publisher = SimulatedPublisher::new(SimulatedPublisherConfig {
            delay_ms: 0,
            ..Default::default()
        });
        let err = publisher
            .publish(&asset(), &DestinationCredentials::new(""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }
}
