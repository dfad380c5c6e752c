//! Trending discovery handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trendrelay_core::{Item, SourceCredentials};

use super::error::{required, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrendingRequest {
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    /// Fetched items as they exist in the queue, in ranking order.
    pub items: Vec<Item>,
    pub count: usize,
}

/// Fetch the trending list and append unseen items to the queue.
pub async fn discover(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TrendingRequest>, JsonRejection>,
) -> Result<Json<TrendingResponse>, ApiError> {
    let Json(request) = payload?;
    let api_key = required(request.api_key, "api_key")?;

    let items = state
        .orchestrator()
        .discover(&SourceCredentials::new(api_key))
        .await?;

    Ok(Json(TrendingResponse {
        count: items.len(),
        items,
    }))
}
