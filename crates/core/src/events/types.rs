use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::item::ItemStatus;

/// Immutable record of one item phase transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// Monotonic within the process.
    pub id: u64,
    pub item_id: String,
    pub item_title: String,
    pub timestamp: DateTime<Utc>,
    /// Item status at emission time.
    pub phase: ItemStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl TransferEvent {
    pub fn is_failure(&self) -> bool {
        self.phase == ItemStatus::Failed
    }
}
