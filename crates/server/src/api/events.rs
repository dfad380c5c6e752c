//! Event log handler.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trendrelay_core::TransferEvent;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
    pub item_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    /// Newest first.
    pub events: Vec<TransferEvent>,
    pub count: usize,
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let orchestrator = state.orchestrator();
    let events = match (&query.item_id, query.limit) {
        (Some(item_id), limit) => {
            let mut events = orchestrator.item_events(item_id).await;
            if let Some(limit) = limit {
                events.truncate(limit);
            }
            events
        }
        (None, Some(limit)) => orchestrator.recent_events(limit).await,
        (None, None) => orchestrator.events().await,
    };

    Json(EventsResponse {
        count: events.len(),
        events,
    })
}
