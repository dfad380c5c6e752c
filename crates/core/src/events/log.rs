use std::collections::VecDeque;

use chrono::Utc;

use super::TransferEvent;
use crate::error::ErrorKind;
use crate::item::ItemStatus;

/// Retention used when none is configured.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 50;

/// Bounded event log, newest first.
///
/// When full, appending silently drops the oldest entry. Stored events are
/// never mutated.
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<TransferEvent>,
    capacity: usize,
    next_id: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// Create a log holding at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Append a new event and return a copy of it.
    pub fn record(
        &mut self,
        item_id: &str,
        item_title: &str,
        phase: ItemStatus,
        message: impl Into<String>,
        error_kind: Option<ErrorKind>,
    ) -> TransferEvent {
        let event = TransferEvent {
            id: self.next_id,
            item_id: item_id.to_string(),
            item_title: item_title.to_string(),
            timestamp: Utc::now(),
            phase,
            message: message.into(),
            error_kind,
        };
        self.next_id += 1;

        self.entries.push_front(event.clone());
        self.entries.truncate(self.capacity);
        event
    }

    /// All retained events, newest first.
    pub fn snapshot(&self) -> Vec<TransferEvent> {
        self.entries.iter().cloned().collect()
    }

    /// At most `limit` newest events.
    pub fn latest(&self, limit: usize) -> Vec<TransferEvent> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// Retained events for one item, newest first.
    pub fn for_item(&self, item_id: &str) -> Vec<TransferEvent> {
        self.entries
            .iter()
            .filter(|e| e.item_id == item_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of events ever recorded, including dropped ones.
    pub fn total_recorded(&self) -> u64 {
        self.next_id - 1
    }
}
