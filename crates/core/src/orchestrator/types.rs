//! Types for the transfer orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::TransferEvent;
use crate::item::{ItemStatus, PublishResult, TransferFailure};

/// Errors that can occur during orchestration.
///
/// Platform failures are never reported here; `transfer` folds them into
/// [`TransferOutcome::Failed`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Item id not present in the queue.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// A status change the state machine does not allow.
    #[error("invalid transition for item {item_id}: {from} -> {to}")]
    InvalidTransition {
        item_id: String,
        from: ItemStatus,
        to: ItemStatus,
    },

    /// Credentials rejected before any upstream call.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The task running a transfer attempt panicked or was aborted.
    #[error("transfer task failed: {0}")]
    TaskFailed(String),
}

/// Result of one `transfer` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransferOutcome {
    /// Both phases succeeded.
    Completed {
        item_id: String,
        result: PublishResult,
    },
    /// One phase failed; the item is now `failed`.
    Failed {
        item_id: String,
        failure: TransferFailure,
        /// Cooldown hint from the platform, for rate-limit and quota failures.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry_after_secs: Option<u64>,
    },
    /// The item was not in a startable status; nothing happened.
    Skipped { item_id: String, status: ItemStatus },
}

impl TransferOutcome {
    pub fn item_id(&self) -> &str {
        match self {
            TransferOutcome::Completed { item_id, .. }
            | TransferOutcome::Failed { item_id, .. }
            | TransferOutcome::Skipped { item_id, .. } => item_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TransferOutcome::Completed { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferOutcome::Completed { .. } => "completed",
            TransferOutcome::Failed { .. } => "failed",
            TransferOutcome::Skipped { .. } => "skipped",
        }
    }
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Whether the auto-cycle is running.
    pub running: bool,
    /// Item currently being transferred, manual or automatic.
    pub active_item: Option<String>,
    pub total_items: usize,
    pub pending_count: usize,
    pub acquiring_count: usize,
    pub publishing_count: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    /// Events recorded since startup, including ones dropped from the log.
    pub events_recorded: u64,
    pub last_discovery_at: Option<DateTime<Utc>>,
}

/// Notification pushed to the update callback.
#[derive(Debug, Clone)]
pub enum OrchestratorUpdate {
    /// A new event was appended to the log.
    Event(TransferEvent),
    /// The auto-cycle was started or stopped.
    RunningChanged { running: bool },
    /// Discovery appended new items to the queue.
    ItemsDiscovered { added: usize },
}
