//! Item queue handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trendrelay_core::{DestinationCredentials, Item, TransferOutcome};

use super::error::{required, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListItemsResponse {
    pub items: Vec<Item>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// Queue snapshot in discovery order.
pub async fn list_items(State(state): State<Arc<AppState>>) -> Json<ListItemsResponse> {
    let items = state.orchestrator().items().await;
    Json(ListItemsResponse {
        total: items.len(),
        items,
    })
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    state
        .orchestrator()
        .item(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Item not found: {}", id)))
}

/// Run one transfer attempt.
///
/// A failed transfer is still a 200: the outcome carries the failure and the
/// item keeps it as `last_error`.
pub async fn transfer_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferOutcome>, ApiError> {
    let Json(request) = payload?;
    let access_token = required(request.access_token, "access_token")?;

    let outcome = state
        .orchestrator()
        .transfer(&id, &DestinationCredentials::new(access_token))
        .await?;
    Ok(Json(outcome))
}

pub async fn clear_completed(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    let removed = state.orchestrator().clear_finished().await;
    Json(ClearResponse { removed })
}
