//! Testing utilities and mock implementations.
//!
//! Mock implementations of both platform traits let the orchestrator and the
//! server be exercised without any upstream service.
//!
//! # Example
//!
//! ```rust,ignore
//! use trendrelay_core::testing::{fixtures, MockDestinationClient, MockSourceClient};
//!
//! let source = Arc::new(MockSourceClient::new());
//! let destination = Arc::new(MockDestinationClient::new());
//!
//! // Configure mock responses
//! source.set_trending(vec![fixtures::item("a")]).await;
//! destination.push_error(PlatformError::Rejected("too large".into())).await;
//!
//! // Use in a TransferOrchestrator or AppState...
//! ```

mod mock_destination;
mod mock_source;

pub use mock_destination::{MockDestinationClient, RecordedPublish};
pub use mock_source::MockSourceClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::error::{ErrorKind, PlatformError};
    use crate::item::{AssetRef, Item, ItemStatus};
    use crate::source::{format_duration, format_view_count, watch_url};

    /// Create a pending item with reasonable defaults.
    pub fn item(id: &str) -> Item {
        item_with_views(id, &format!("Video {}", id), 1500)
    }

    /// Create a pending item with a title and view count.
    pub fn item_with_views(id: &str, title: &str, view_count: u64) -> Item {
        let duration_secs = 212;
        Item {
            id: id.to_string(),
            title: title.to_string(),
            channel: "Mock Channel".to_string(),
            thumbnail_url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
            view_count,
            view_count_label: format_view_count(view_count),
            duration_secs,
            duration_label: format_duration(duration_secs),
            source_url: watch_url(id),
            status: ItemStatus::Pending,
            discovered_at: Utc::now(),
            last_error: None,
            publish_result: None,
        }
    }

    /// Create a resolved asset for an item id.
    pub fn asset(item_id: &str) -> AssetRef {
        AssetRef {
            item_id: item_id.to_string(),
            location: format!("mock://assets/{}.mp4", item_id),
            format: "mp4".to_string(),
            resolution: Some("720p".to_string()),
            size_bytes: None,
            resolved_at: Utc::now(),
        }
    }

    /// Build a platform error of the given kind.
    pub fn platform_error(kind: ErrorKind, message: &str) -> PlatformError {
        let message = message.to_string();
        match kind {
            ErrorKind::InvalidInput => PlatformError::InvalidInput(message),
            ErrorKind::Auth => PlatformError::Auth(message),
            ErrorKind::RateLimited => PlatformError::RateLimited {
                message,
                retry_after: None,
            },
            ErrorKind::QuotaExceeded => PlatformError::QuotaExceeded {
                message,
                retry_after: None,
            },
            ErrorKind::NotFound => PlatformError::NotFound(message),
            ErrorKind::Rejected => PlatformError::Rejected(message),
            ErrorKind::Upstream => PlatformError::Upstream(message),
            ErrorKind::Internal => PlatformError::Internal(message),
        }
    }
}
