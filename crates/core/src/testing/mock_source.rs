//! Mock source client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::error::{ErrorKind, PlatformError};
use crate::item::{AssetRef, Item, SourceCredentials};
use crate::source::SourceClient;

/// Mock implementation of the SourceClient trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable trending list
/// - Track resolve calls for assertions
/// - Simulate failures (one-shot or per item) and latency
///
/// # Example
///
/// ```rust,ignore
/// let source = MockSourceClient::new();
/// source.set_trending(vec![fixtures::item("a"), fixtures::item("b")]).await;
/// source.fail_item("b", ErrorKind::NotFound).await;
///
/// let items = source.list_trending(&SourceCredentials::new("key")).await?;
/// assert_eq!(items.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockSourceClient {
    /// Trending list returned by `list_trending`.
    trending: Arc<RwLock<Vec<Item>>>,
    /// One-shot errors for `list_trending`, consumed in order.
    list_errors: Arc<RwLock<VecDeque<PlatformError>>>,
    /// One-shot errors for `resolve_asset`, consumed in order.
    resolve_errors: Arc<RwLock<VecDeque<PlatformError>>>,
    /// Items that fail to resolve every time, with the kind to fail with.
    failing_items: Arc<RwLock<HashMap<String, ErrorKind>>>,
    /// Latency added to every resolve.
    resolve_delay: Arc<RwLock<Duration>>,
    /// Number of list_trending calls.
    list_count: AtomicUsize,
    /// Item ids passed to resolve_asset, in call order.
    resolve_calls: Arc<RwLock<Vec<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSourceClient {
    /// Create a new mock source with an empty trending list.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_trending(&self, items: Vec<Item>) {
        *self.trending.write().await = items;
    }

    /// Make the next `list_trending` call fail.
    pub async fn push_list_error(&self, error: PlatformError) {
        self.list_errors.write().await.push_back(error);
    }

    /// Make the next `resolve_asset` call fail.
    pub async fn push_resolve_error(&self, error: PlatformError) {
        self.resolve_errors.write().await.push_back(error);
    }

    /// Make every resolve of `item_id` fail with `kind`.
    pub async fn fail_item(&self, item_id: &str, kind: ErrorKind) {
        self.failing_items
            .write()
            .await
            .insert(item_id.to_string(), kind);
    }

    pub async fn set_resolve_delay(&self, delay: Duration) {
        *self.resolve_delay.write().await = delay;
    }

    pub fn list_count(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    pub async fn resolve_calls(&self) -> Vec<String> {
        self.resolve_calls.read().await.clone()
    }

    /// Highest number of concurrent resolve calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceClient for MockSourceClient {
    fn name(&self) -> &'static str {
        "mock-source"
    }

    async fn list_trending(
        &self,
        credentials: &SourceCredentials,
    ) -> Result<Vec<Item>, PlatformError> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        credentials.validate()?;

        if let Some(error) = self.list_errors.write().await.pop_front() {
            return Err(error);
        }
        Ok(self.trending.read().await.clone())
    }

    async fn resolve_asset(&self, item: &Item) -> Result<AssetRef, PlatformError> {
        self.resolve_calls.write().await.push(item.id.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.resolve_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.resolve_errors.write().await.pop_front() {
            return Err(error);
        }
        if let Some(kind) = self.failing_items.read().await.get(&item.id) {
            return Err(fixtures::platform_error(
                *kind,
                &format!("mock resolve failure for {}", item.id),
            ));
        }

        Ok(AssetRef {
            item_id: item.id.clone(),
            location: format!("mock://assets/{}.mp4", item.id),
            format: "mp4".to_string(),
            resolution: Some("720p".to_string()),
            size_bytes: Some(1024 * 1024),
            resolved_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_list_and_errors() {
        let source = MockSourceClient::new();
        source.set_trending(vec![fixtures::item("a")]).await;
        source
            .push_list_error(PlatformError::Upstream("down".to_string()))
            .await;

        let credentials = SourceCredentials::new("key");
        assert!(source.list_trending(&credentials).await.is_err());
        assert_eq!(source.list_trending(&credentials).await.unwrap().len(), 1);
        assert_eq!(source.list_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_resolve_failing_item() {
        let source = MockSourceClient::new();
        source.fail_item("b", ErrorKind::NotFound).await;

        assert!(source.resolve_asset(&fixtures::item("a")).await.is_ok());
        let err = source.resolve_asset(&fixtures::item("b")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(source.resolve_calls().await, vec!["a", "b"]);
    }
}
