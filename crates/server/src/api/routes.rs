use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{
    boundary, events, handlers, items, middleware::metrics_middleware, orchestrator, trending, ws,
};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Discovery
        .route("/trending", post(trending::discover))
        // Items
        .route("/items", get(items::list_items))
        .route("/items/completed", delete(items::clear_completed))
        .route("/items/{id}", get(items::get_item))
        .route("/items/{id}/transfer", post(items::transfer_item))
        // Events
        .route("/events", get(events::list_events))
        // Orchestrator
        .route("/orchestrator/status", get(orchestrator::get_status))
        .route("/orchestrator/start", post(orchestrator::start))
        .route("/orchestrator/stop", post(orchestrator::stop))
        // Platform passthrough
        .route("/source/resolve", post(boundary::resolve))
        .route("/destination/publish", post(boundary::publish))
        // Real-time updates
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .fallback(handlers::fallback)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
