//! Direct access to the platform clients.
//!
//! These bypass the queue: nothing is recorded in the event log and no item
//! changes status. Platform errors surface with their mapped HTTP status.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use trendrelay_core::{
    source::{extract_video_id, watch_url},
    AssetRef, DestinationCredentials, Item, ItemStatus, PublishResult,
};

use super::error::{required, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub asset_ref: Option<AssetRef>,
    pub access_token: Option<String>,
}

/// Resolve a video URL to an asset.
///
/// Uses the queued item when the video was discovered, otherwise a bare
/// item built from the URL.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<AssetRef>, ApiError> {
    let Json(request) = payload?;
    let video_url = required(request.video_url, "video_url")?;
    let video_id = extract_video_id(&video_url)
        .ok_or_else(|| ApiError::invalid_input(format!("No video id in {}", video_url)))?;

    let orchestrator = state.orchestrator();
    let item = match orchestrator.item(&video_id).await {
        Some(item) => item,
        None => {
            debug!("Resolving {} outside the queue", video_id);
            bare_item(&video_id)
        }
    };

    let asset = orchestrator.source().resolve_asset(&item).await?;
    Ok(Json(asset))
}

/// Publish an already resolved asset.
pub async fn publish(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<Json<PublishResult>, ApiError> {
    let Json(request) = payload?;
    let access_token = required(request.access_token, "access_token")?;
    let asset = request
        .asset_ref
        .ok_or_else(|| ApiError::invalid_input("asset_ref is required"))?;

    let result = state
        .orchestrator()
        .destination()
        .publish(&asset, &DestinationCredentials::new(access_token))
        .await?;
    Ok(Json(result))
}

fn bare_item(video_id: &str) -> Item {
    Item {
        id: video_id.to_string(),
        title: String::new(),
        channel: String::new(),
        thumbnail_url: String::new(),
        view_count: 0,
        view_count_label: "0".to_string(),
        duration_secs: 0,
        duration_label: "0:00".to_string(),
        source_url: watch_url(video_id),
        status: ItemStatus::Pending,
        discovered_at: Utc::now(),
        last_error: None,
        publish_result: None,
    }
}
