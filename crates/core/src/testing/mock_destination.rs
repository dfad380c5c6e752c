//! Mock destination client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::destination::DestinationClient;
use crate::error::{ErrorKind, PlatformError};
use crate::item::{AssetRef, DestinationCredentials, PublishResult};

/// A recorded publish for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPublish {
    /// The asset that was published.
    pub asset: AssetRef,
    /// Token the call was made with.
    pub access_token: String,
    /// When the call was made.
    pub timestamp: chrono::DateTime<Utc>,
}

/// Mock implementation of the DestinationClient trait.
///
/// Provides controllable behavior for testing:
/// - Track publish calls for assertions
/// - Simulate failures (one-shot or per item) and latency
/// - Observe how many publishes ran concurrently
///
/// # Example
///
/// ```rust,ignore
/// let destination = MockDestinationClient::new();
/// destination.push_error(PlatformError::Rejected("too large".into())).await;
///
/// // ... run a transfer ...
///
/// let published = destination.published().await;
/// assert_eq!(published.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDestinationClient {
    /// Recorded publish calls.
    published: Arc<RwLock<Vec<RecordedPublish>>>,
    /// One-shot errors, consumed in order.
    errors: Arc<RwLock<VecDeque<PlatformError>>>,
    /// Items that fail to publish every time, with the kind to fail with.
    failing_items: Arc<RwLock<HashMap<String, ErrorKind>>>,
    /// Latency added to every publish.
    delay: Arc<RwLock<Duration>>,
    /// Counter for generating remote ids.
    counter: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockDestinationClient {
    /// Create a new mock destination that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next publish fail.
    pub async fn push_error(&self, error: PlatformError) {
        self.errors.write().await.push_back(error);
    }

    /// Make every publish of `item_id` fail with `kind`.
    pub async fn fail_item(&self, item_id: &str, kind: ErrorKind) {
        self.failing_items
            .write()
            .await
            .insert(item_id.to_string(), kind);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// All recorded publish calls, including failed ones.
    pub async fn published(&self) -> Vec<RecordedPublish> {
        self.published.read().await.clone()
    }

    pub async fn publish_count(&self) -> usize {
        self.published.read().await.len()
    }

    /// Highest number of concurrent publish calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DestinationClient for MockDestinationClient {
    fn name(&self) -> &'static str {
        "mock-destination"
    }

    async fn publish(
        &self,
        asset: &AssetRef,
        credentials: &DestinationCredentials,
    ) -> Result<PublishResult, PlatformError> {
        self.published.write().await.push(RecordedPublish {
            asset: asset.clone(),
            access_token: credentials.access_token.clone(),
            timestamp: Utc::now(),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.errors.write().await.pop_front() {
            return Err(error);
        }
        if let Some(kind) = self.failing_items.read().await.get(&asset.item_id) {
            return Err(fixtures::platform_error(
                *kind,
                &format!("mock publish failure for {}", asset.item_id),
            ));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let remote_id = format!("mock_{}", n);
        Ok(PublishResult {
            share_url: format!("https://mock.example/v/{}", remote_id),
            remote_id,
            published_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_publish_records_calls() {
        let destination = MockDestinationClient::new();
        let credentials = DestinationCredentials::new("token");

        let first = destination
            .publish(&fixtures::asset("a"), &credentials)
            .await
            .unwrap();
        let second = destination
            .publish(&fixtures::asset("b"), &credentials)
            .await
            .unwrap();

        assert_eq!(first.remote_id, "mock_1");
        assert_eq!(second.remote_id, "mock_2");
        let published = destination.published().await;
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].asset.item_id, "a");
        assert_eq!(published[0].access_token, "token");
    }

    #[tokio::test]
    async fn test_mock_publish_errors_consumed_in_order() {
        let destination = MockDestinationClient::new();
        destination
            .push_error(PlatformError::Upstream("502".to_string()))
            .await;
        let credentials = DestinationCredentials::new("token");

        let err = destination
            .publish(&fixtures::asset("a"), &credentials)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(destination
            .publish(&fixtures::asset("a"), &credentials)
            .await
            .is_ok());
    }
}
