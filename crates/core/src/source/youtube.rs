//! YouTube Data API v3 client.
//!
//! The trending list comes from `videos?chart=mostPopular` and needs an API
//! key. Asset resolution goes through the keyless oEmbed endpoint, which
//! answers 404 (or 401 for private videos) once a video is gone.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::{
    extract_video_id, format_duration, format_view_count, parse_iso8601_duration, watch_url,
};
use super::SourceClient;
use crate::error::{parse_retry_after, PlatformError};
use crate::item::{AssetRef, Item, ItemStatus, SourceCredentials};

/// YouTube client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// Data API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// oEmbed endpoint used to check that a video still resolves.
    #[serde(default = "default_oembed_url")]
    pub oembed_url: String,
    /// Region the trending chart is computed for (ISO 3166-1 alpha-2).
    #[serde(default = "default_region_code")]
    pub region_code: String,
    /// Items per trending fetch (API maximum is 50).
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_oembed_url() -> String {
    "https://www.youtube.com/oembed".to_string()
}

fn default_region_code() -> String {
    "FR".to_string()
}

fn default_max_results() -> u32 {
    20
}

fn default_timeout() -> u64 {
    30
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            oembed_url: default_oembed_url(),
            region_code: default_region_code(),
            max_results: default_max_results(),
            timeout_secs: default_timeout(),
        }
    }
}

/// YouTube source client.
pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    /// Create a new YouTube client.
    pub fn new(config: YouTubeConfig) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlatformError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Map a non-success Data API response onto the error taxonomy.
    async fn api_error(response: reqwest::Response) -> PlatformError {
        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();

        let (message, reason) = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
            Ok(envelope) => {
                let reason = envelope
                    .error
                    .errors
                    .first()
                    .and_then(|e| e.reason.clone())
                    .unwrap_or_default();
                (envelope.error.message, reason)
            }
            Err(_) if body.is_empty() => (format!("HTTP {}", status), String::new()),
            Err(_) => (body, String::new()),
        };

        classify_api_error(status, &reason, message, retry_after)
    }
}

/// Classify a Data API error by status and vendor reason.
fn classify_api_error(
    status: StatusCode,
    reason: &str,
    message: String,
    retry_after: Option<Duration>,
) -> PlatformError {
    let quota_reason = matches!(
        reason,
        "quotaExceeded" | "rateLimitExceeded" | "dailyLimitExceeded" | "userRateLimitExceeded"
    );

    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && quota_reason)
    {
        return PlatformError::RateLimited {
            message,
            retry_after,
        };
    }
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || (status == StatusCode::BAD_REQUEST && reason == "keyInvalid")
    {
        return PlatformError::Auth(message);
    }
    PlatformError::Upstream(format!("HTTP {}: {}", status.as_u16(), message))
}

#[async_trait]
impl SourceClient for YouTubeClient {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn list_trending(
        &self,
        credentials: &SourceCredentials,
    ) -> Result<Vec<Item>, PlatformError> {
        credentials.validate()?;

        let url = format!("{}/videos", self.config.base_url);
        let max_results = self.config.max_results.to_string();
        debug!(
            "YouTube trending fetch: region={}, max_results={}",
            self.config.region_code, self.config.max_results
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,statistics,contentDetails"),
                ("chart", "mostPopular"),
                ("regionCode", self.config.region_code.as_str()),
                ("maxResults", max_results.as_str()),
                ("key", credentials.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let list: VideoListResponse = response.json().await.map_err(|e| {
            PlatformError::Upstream(format!("failed to parse trending response: {}", e))
        })?;

        let items: Vec<Item> = list
            .items
            .into_iter()
            .take(self.config.max_results as usize)
            .map(Item::from)
            .collect();

        debug!("YouTube trending fetch returned {} items", items.len());
        Ok(items)
    }

    async fn resolve_asset(&self, item: &Item) -> Result<AssetRef, PlatformError> {
        let video_id = extract_video_id(&item.source_url).ok_or_else(|| {
            PlatformError::InvalidInput(format!("invalid video URL: {}", item.source_url))
        })?;
        let canonical = watch_url(&video_id);

        debug!("YouTube resolve: id={}", video_id);

        let response = self
            .client
            .get(&self.config.oembed_url)
            .query(&[("url", canonical.as_str()), ("format", "json")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND
            || status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
        {
            return Err(PlatformError::NotFound(format!(
                "video {} is no longer available",
                video_id
            )));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PlatformError::RateLimited {
                message: "oEmbed rate limit".to_string(),
                retry_after: parse_retry_after(response.headers()),
            });
        }
        if status == StatusCode::BAD_REQUEST {
            return Err(PlatformError::InvalidInput(format!(
                "locator rejected by source: {}",
                item.source_url
            )));
        }
        if !status.is_success() {
            return Err(PlatformError::Upstream(format!(
                "resolve failed: HTTP {}",
                status.as_u16()
            )));
        }

        // Only the fact that the video resolves matters, the body is checked for shape.
        let _: OEmbedResponse = response.json().await.map_err(|e| {
            PlatformError::Upstream(format!("failed to parse oEmbed response: {}", e))
        })?;

        Ok(AssetRef {
            item_id: item.id.clone(),
            location: canonical,
            format: "mp4".to_string(),
            resolution: Some("720p".to_string()),
            size_bytes: None,
            resolved_at: Utc::now(),
        })
    }
}

// ============================================================================
// YouTube API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    #[serde(default)]
    snippet: Option<Snippet>,
    #[serde(default)]
    statistics: Option<Statistics>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    high: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    // The API encodes counts as decimal strings
    #[serde(default)]
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct OEmbedResponse {
    #[serde(default)]
    title: Option<String>,
}

// ============================================================================
// Conversion to domain types
// ============================================================================

impl From<VideoResource> for Item {
    fn from(v: VideoResource) -> Self {
        let (title, channel, thumbnail_url) = match v.snippet {
            Some(s) => {
                let thumb = s
                    .thumbnails
                    .medium
                    .or(s.thumbnails.high)
                    .or(s.thumbnails.default)
                    .map(|t| t.url)
                    .unwrap_or_default();
                (s.title, s.channel_title, thumb)
            }
            None => (String::new(), String::new(), String::new()),
        };

        let view_count = v
            .statistics
            .and_then(|s| s.view_count)
            .and_then(|c| c.parse::<u64>().ok())
            .unwrap_or(0);

        let duration_secs = v
            .content_details
            .and_then(|c| c.duration)
            .map(|d| parse_iso8601_duration(&d))
            .unwrap_or(0);

        Self {
            source_url: watch_url(&v.id),
            id: v.id,
            title,
            channel,
            thumbnail_url,
            view_count,
            view_count_label: format_view_count(view_count),
            duration_secs,
            duration_label: format_duration(duration_secs),
            status: ItemStatus::Pending,
            discovered_at: Utc::now(),
            last_error: None,
            publish_result: None,
        }
    }
}
