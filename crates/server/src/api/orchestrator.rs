//! Orchestrator API handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trendrelay_core::{
    DestinationCredentials, OrchestratorStatus, SessionConfig, SourceCredentials,
};

use super::error::{required, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Session credentials for the auto-cycle.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub access_token: Option<String>,
    /// When present, the cycle also refreshes the trending list.
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunningResponse {
    pub running: bool,
    /// Whether this call changed the running state.
    pub changed: bool,
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator().status().await)
}

/// Start the auto-cycle.
pub async fn start(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<RunningResponse>, ApiError> {
    let Json(request) = payload?;
    let access_token = required(request.access_token, "access_token")?;

    let mut session = SessionConfig::new(DestinationCredentials::new(access_token));
    if let Some(api_key) = request.api_key.filter(|k| !k.trim().is_empty()) {
        session = session.with_source(SourceCredentials::new(api_key));
    }

    let changed = state
        .orchestrator()
        .set_auto_run(true, Some(session))
        .await?;

    Ok(Json(RunningResponse {
        running: true,
        changed,
        message: if changed {
            "Auto-cycle started".to_string()
        } else {
            "Auto-cycle already running".to_string()
        },
    }))
}

/// Stop the auto-cycle. An in-flight transfer finishes.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<Json<RunningResponse>, ApiError> {
    let changed = state.orchestrator().set_auto_run(false, None).await?;

    Ok(Json(RunningResponse {
        running: false,
        changed,
        message: if changed {
            "Auto-cycle stopped".to_string()
        } else {
            "Auto-cycle not running".to_string()
        },
    }))
}
