//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock platform clients injected, so every endpoint can be exercised
//! without any upstream service.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use trendrelay_core::{
    testing::{MockDestinationClient, MockSourceClient},
    Config, DestinationClient, OrchestratorConfig, OrchestratorUpdate, RetryConfig, SourceClient,
    TransferOrchestrator,
};
use trendrelay_server::api::{create_router, WsBroadcaster};
use trendrelay_server::state::AppState;

/// Re-export fixtures for test convenience
pub use trendrelay_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_discovery() {
///     let fixture = TestFixture::new();
///     fixture.source.set_trending(vec![fixtures::item("a")]).await;
///
///     let response = fixture.post("/api/v1/trending", json!({ "api_key": "k" })).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock source - configure trending lists and resolve failures
    pub source: Arc<MockSourceClient>,
    /// Mock destination - record and fail publishes
    pub destination: Arc<MockDestinationClient>,
    /// Orchestrator behind the router
    pub orchestrator: Arc<TransferOrchestrator>,
    pub ws_broadcaster: WsBroadcaster,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with fast timings.
    pub fn new() -> Self {
        Self::with_orchestrator_config(test_orchestrator_config())
    }

    pub fn with_orchestrator_config(orchestrator_config: OrchestratorConfig) -> Self {
        let source = Arc::new(MockSourceClient::new());
        let destination = Arc::new(MockDestinationClient::new());

        let config = Config {
            orchestrator: orchestrator_config.clone(),
            ..Config::default()
        };

        let ws_broadcaster = WsBroadcaster::default();
        let broadcaster_for_callback = ws_broadcaster.clone();
        let orchestrator = Arc::new(
            TransferOrchestrator::new(
                orchestrator_config,
                Arc::clone(&source) as Arc<dyn SourceClient>,
                Arc::clone(&destination) as Arc<dyn DestinationClient>,
            )
            .with_update_callback(Arc::new(move |update: &OrchestratorUpdate| {
                broadcaster_for_callback.publish_update(update);
            })),
        );

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&orchestrator),
            ws_broadcaster.clone(),
        ));
        let router = create_router(state);

        Self {
            router,
            source,
            destination,
            orchestrator,
            ws_broadcaster,
        }
    }

    /// Discover the given items through the API.
    pub async fn seed(&self, ids: &[&str]) {
        self.source
            .set_trending(ids.iter().map(|id| fixtures::item(id)).collect())
            .await;
        let response = self
            .post("/api/v1/trending", serde_json::json!({ "api_key": "test-key" }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "seeding failed: {}", response.body);
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Orchestrator settings with short waits and no backoff.
pub fn test_orchestrator_config() -> OrchestratorConfig {
    OrchestratorConfig {
        auto_poll_interval_ms: 10,
        discovery_interval_secs: 0,
        call_timeout_secs: 5,
        rate_limit_cooldown_secs: 1,
        event_log_capacity: 50,
        retry: RetryConfig {
            max_attempts: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        },
    }
}

/// Poll until `condition` holds or the timeout expires.
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
