//! Observable persisted state
//!
//! A [`Persisted`] cell owns one value stored under one key. Reads are cheap
//! clones, every change is written through to the [`KeyValueStore`] exactly
//! once, and subscribers observe changes through a `tokio::sync::watch`
//! receiver. Writes that leave the value unchanged neither persist nor wake
//! subscribers.

use crate::storage::{self, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// A value loaded from and written through to a key-value store
pub struct Persisted<T> {
    key: &'static str,
    store: Arc<dyn KeyValueStore>,
    tx: watch::Sender<T>,
}

impl<T> std::fmt::Debug for Persisted<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("value", &*self.tx.borrow())
            .finish()
    }
}

impl<T> Persisted<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned,
{
    /// Load the cell from `store`, falling back to `default`
    pub fn load(store: Arc<dyn KeyValueStore>, key: &'static str, default: T) -> Self {
        let value = storage::load(store.as_ref(), key, default);
        let (tx, _rx) = watch::channel(value);
        Self { key, store, tx }
    }

    /// Storage key backing this cell
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Apply `f` to a copy of the value and commit it if it changed
    ///
    /// Returns `true` when the value changed (and was persisted).
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut persisted = None;
        let changed = self.tx.send_if_modified(|current| {
            let mut next = current.clone();
            f(&mut next);
            if next == *current {
                return false;
            }
            *current = next;
            persisted = Some(storage::save(self.store.as_ref(), self.key, &*current));
            true
        });

        if persisted == Some(false) {
            tracing::warn!(key = self.key, "Value changed in memory but was not persisted");
        }

        changed
    }

    /// Replace the value; returns `true` when it changed
    pub fn set(&self, value: T) -> bool {
        self.update(|current| *current = value)
    }

    /// Subscribe to changes
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, MemoryStore, MockKeyValueStore};

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_load_uses_default_then_stored_value() {
        let store = memory();
        let goal = Persisted::load(store.clone(), keys::CALORIE_GOAL, 2000u32);
        assert_eq!(goal.get(), 2000);

        assert!(goal.set(1800));
        let reloaded = Persisted::load(store, keys::CALORIE_GOAL, 2000u32);
        assert_eq!(reloaded.get(), 1800);
    }

    #[test]
    fn test_unchanged_value_is_not_written() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get().returning(|_| Ok(None));
        mock.expect_set().times(1).returning(|_, _| Ok(()));

        let intake = Persisted::load(Arc::new(mock), keys::WATER_INTAKE, 0u32);
        assert!(intake.set(250));
        assert!(!intake.set(250));
        assert!(!intake.update(|v| *v += 0));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let enabled = Persisted::load(memory(), keys::REMINDERS_ENABLED, false);
        let mut rx = enabled.subscribe();

        assert!(enabled.set(true));
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());

        assert!(!enabled.set(true));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_failed_write_still_updates_memory() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get().returning(|_| Ok(None));
        mock.expect_set()
            .returning(|_, _| Err(crate::error::FitbotError::Storage("full".into()).into()));

        let goal = Persisted::load(Arc::new(mock), keys::HYDRATION_GOAL, 2500u32);
        assert!(goal.set(3000));
        assert_eq!(goal.get(), 3000);
    }
}
