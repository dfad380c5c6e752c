//! JSON-over-HTTP publisher.
//!
//! `POST {base_url}/publish` with `{asset_ref, access_token}`; the token is
//! also sent as a bearer header. Success bodies look like
//! `{success, remote_id, share_url, published_at}`, failures carry an
//! `error` or `message` string.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DestinationClient;
use crate::error::{parse_retry_after, PlatformError};
use crate::item::{AssetRef, DestinationCredentials, PublishResult};

/// HTTP publisher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpPublisherConfig {
    /// Base URL of the content API (the publish route is appended).
    pub base_url: String,
    /// Request timeout in seconds. Uploads are slow, so this is generous.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    120
}

/// Publisher for a JSON content API.
pub struct HttpPublisher {
    client: Client,
    publish_url: String,
}

impl HttpPublisher {
    /// Create a new publisher.
    pub fn new(config: HttpPublisherConfig) -> Result<Self, PlatformError> {
        if config.base_url.trim().is_empty() {
            return Err(PlatformError::InvalidInput(
                "destination base_url is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlatformError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            publish_url: format!("{}/publish", config.base_url.trim_end_matches('/')),
        })
    }
}

/// Map a non-success publish response onto the error taxonomy.
fn classify_publish_error(
    status: StatusCode,
    message: String,
    retry_after: Option<Duration>,
) -> PlatformError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PlatformError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => PlatformError::QuotaExceeded {
            message,
            retry_after,
        },
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNSUPPORTED_MEDIA_TYPE
        | StatusCode::UNPROCESSABLE_ENTITY => PlatformError::Rejected(message),
        _ => PlatformError::Upstream(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

#[async_trait]
impl DestinationClient for HttpPublisher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn publish(
        &self,
        asset: &AssetRef,
        credentials: &DestinationCredentials,
    ) -> Result<PublishResult, PlatformError> {
        credentials.validate()?;

        debug!("Publishing asset for item {} to {}", asset.item_id, self.publish_url);

        let response = self
            .client
            .post(&self.publish_url)
            .bearer_auth(&credentials.access_token)
            .json(&PublishRequest {
                asset_ref: asset,
                access_token: &credentials.access_token,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<PublishErrorBody>(&body)
                .ok()
                .and_then(PublishErrorBody::into_message)
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        format!("HTTP {}", status)
                    } else {
                        body
                    }
                });
            return Err(classify_publish_error(status, message, retry_after));
        }

        let body: PublishResponse = response.json().await.map_err(|e| {
            PlatformError::Upstream(format!("failed to parse publish response: {}", e))
        })?;

        body.into_result()
    }
}

// ============================================================================
// Wire types (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    asset_ref: &'a AssetRef,
    access_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    success: bool,
    #[serde(default)]
    remote_id: Option<String>,
    #[serde(default)]
    share_url: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    error: Option<String>,
}

impl PublishResponse {
    fn into_result(self) -> Result<PublishResult, PlatformError> {
        if !self.success {
            return Err(PlatformError::Rejected(
                self.error
                    .unwrap_or_else(|| "publish reported failure".to_string()),
            ));
        }

        let remote_id = self.remote_id.ok_or_else(|| {
            PlatformError::Upstream("publish response missing remote_id".to_string())
        })?;

        Ok(PublishResult {
            remote_id,
            share_url: self.share_url.unwrap_or_default(),
            published_at: self.published_at.unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PublishErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl PublishErrorBody {
    fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}
