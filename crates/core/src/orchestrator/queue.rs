//! In-memory item queue, keyed by id, kept in discovery order.

use std::collections::{HashMap, HashSet};

use super::types::OrchestratorError;
use crate::item::{Item, ItemStatus};

#[derive(Debug, Default)]
pub(crate) struct ItemQueue {
    order: Vec<String>,
    items: HashMap<String, Item>,
    /// Every id ever queued this session, including cleared ones.
    seen: HashSet<String>,
}

impl ItemQueue {
    /// Append items whose id was never queued this session, in the given
    /// order, as `pending`. Existing and cleared items are left alone.
    ///
    /// Returns how many were added.
    pub fn append_unseen(&mut self, fetched: &[Item]) -> usize {
        let mut added = 0;
        for item in fetched {
            if !self.seen.insert(item.id.clone()) {
                continue;
            }
            let mut item = item.clone();
            item.status = ItemStatus::Pending;
            item.last_error = None;
            item.publish_result = None;
            self.order.push(item.id.clone());
            self.items.insert(item.id.clone(), item);
            added += 1;
        }
        added
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Move an item to `next`, enforcing the state machine.
    pub fn transition(
        &mut self,
        id: &str,
        next: ItemStatus,
    ) -> Result<&mut Item, OrchestratorError> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| OrchestratorError::ItemNotFound(id.to_string()))?;

        if !item.status.can_transition_to(next) {
            return Err(OrchestratorError::InvalidTransition {
                item_id: id.to_string(),
                from: item.status,
                to: next,
            });
        }

        item.status = next;
        Ok(item)
    }

    /// Cloned items in discovery order.
    pub fn snapshot(&self) -> Vec<Item> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id))
            .cloned()
            .collect()
    }

    /// Cloned items for the given ids, skipping unknown ones.
    pub fn select(&self, ids: &[String]) -> Vec<Item> {
        ids.iter()
            .filter_map(|id| self.items.get(id))
            .cloned()
            .collect()
    }

    /// Id of the earliest-discovered pending item.
    pub fn first_pending(&self) -> Option<String> {
        self.order
            .iter()
            .find(|id| {
                self.items
                    .get(id.as_str())
                    .map(|item| item.status == ItemStatus::Pending)
                    .unwrap_or(false)
            })
            .cloned()
    }

    /// Drop completed items. Their ids stay known, so rediscovery does not
    /// queue them again. Returns how many were removed.
    pub fn remove_completed(&mut self) -> usize {
        let before = self.order.len();
        let items = &mut self.items;
        self.order.retain(|id| {
            let completed = items
                .get(id)
                .map(|item| item.status == ItemStatus::Completed)
                .unwrap_or(true);
            if completed {
                items.remove(id);
            }
            !completed
        });
        before - self.order.len()
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.values().filter(|i| i.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}
