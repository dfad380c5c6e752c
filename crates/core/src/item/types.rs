//! Item data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PlatformError};

/// Transfer status of an item.
///
/// Legal transitions:
/// `pending -> acquiring -> publishing -> completed`, `acquiring -> failed`,
/// `publishing -> failed`, and `failed -> acquiring` when a failed item is
/// resubmitted. Nothing leaves `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Acquiring,
    Publishing,
    Completed,
    Failed,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Acquiring => "acquiring",
            ItemStatus::Publishing => "publishing",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
        }
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Pending, ItemStatus::Acquiring)
                | (ItemStatus::Failed, ItemStatus::Acquiring)
                | (ItemStatus::Acquiring, ItemStatus::Publishing)
                | (ItemStatus::Acquiring, ItemStatus::Failed)
                | (ItemStatus::Publishing, ItemStatus::Completed)
                | (ItemStatus::Publishing, ItemStatus::Failed)
        )
    }

    /// Whether a new transfer attempt may start from this status.
    pub fn can_start_transfer(self) -> bool {
        matches!(self, ItemStatus::Pending | ItemStatus::Failed)
    }

    /// Whether a transfer is currently working on the item.
    pub fn is_in_flight(self) -> bool {
        matches!(self, ItemStatus::Acquiring | ItemStatus::Publishing)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind and message of the most recent failure of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&PlatformError> for TransferFailure {
    fn from(e: &PlatformError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// A discovered piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable source id, unique within a session.
    pub id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail_url: String,
    pub view_count: u64,
    /// Compact view count ("999", "1.5K", "2.3M").
    pub view_count_label: String,
    pub duration_secs: u64,
    /// "m:ss" or "h:mm:ss".
    pub duration_label: String,
    /// Locator used to resolve the downloadable asset.
    pub source_url: String,
    pub status: ItemStatus,
    pub discovered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<TransferFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_result: Option<PublishResult>,
}

/// Opaque handle to a resolved, transferable media object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub item_id: String,
    /// Where the media can be fetched from.
    pub location: String,
    /// Container format, e.g. "mp4".
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub resolved_at: DateTime<Utc>,
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub remote_id: String,
    pub share_url: String,
    pub published_at: DateTime<Utc>,
}
