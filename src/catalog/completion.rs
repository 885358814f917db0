//! Completed exercise tracking

use crate::state::Persisted;
use crate::storage::{keys, KeyValueStore};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Set of exercise ids the user has marked complete
#[derive(Debug)]
pub struct CompletionTracker {
    completed: Persisted<BTreeSet<u32>>,
}

impl CompletionTracker {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            completed: Persisted::load(store, keys::COMPLETED_EXERCISES, BTreeSet::new()),
        }
    }

    /// Flip the completion state of `id`; returns whether it is now complete
    pub fn toggle(&self, id: u32) -> bool {
        let mut now_complete = false;
        self.completed.update(|set| {
            now_complete = if set.remove(&id) {
                false
            } else {
                set.insert(id)
            };
        });
        tracing::debug!(id, now_complete, "Toggled exercise completion");
        now_complete
    }

    pub fn is_completed(&self, id: u32) -> bool {
        self.completed.get().contains(&id)
    }

    pub fn completed(&self) -> BTreeSet<u32> {
        self.completed.get()
    }
}
