//! Source platform client.
//!
//! The source platform publishes a ranked list of trending videos and lets a
//! single video be resolved to a transferable asset.

mod normalize;
mod youtube;

pub use normalize::{
    extract_video_id, format_duration, format_view_count, parse_iso8601_duration, watch_url,
};
pub use youtube::{YouTubeClient, YouTubeConfig};

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::item::{AssetRef, Item, SourceCredentials};

/// Client for the platform items are discovered on.
///
/// Implementations are stateless: credentials arrive with each call and are
/// not retained.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Backend name for logs and status output.
    fn name(&self) -> &'static str;

    /// Fetch the current trending list, in upstream ranking order.
    ///
    /// Every returned item is `pending`.
    async fn list_trending(
        &self,
        credentials: &SourceCredentials,
    ) -> Result<Vec<Item>, PlatformError>;

    /// Resolve an item to a downloadable asset.
    ///
    /// Fails with `NotFound` when the locator no longer resolves.
    async fn resolve_asset(&self, item: &Item) -> Result<AssetRef, PlatformError>;
}
