//! Application context shared by the CLI commands

use crate::catalog::{Catalog, CompletionTracker};
use crate::config::Config;
use crate::error::Result;
use crate::gateway::AiGateway;
use crate::preferences::Preferences;
use crate::reminder::ConsoleNotifier;
use crate::storage::{KeyValueStore, StoreLocation};
use crate::tracker::Tracker;
use std::sync::Arc;

/// Everything a command needs, loaded once per invocation
pub struct App {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub catalog: Catalog,
    pub tracker: Tracker,
    pub completion: CompletionTracker,
    pub preferences: Preferences,
    location: StoreLocation,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Open the configured store and load all persisted state
    ///
    /// # Errors
    ///
    /// Returns `FitbotError::Storage` if the store cannot be opened and
    /// `FitbotError::Catalog` if the built-in catalog is malformed
    pub fn open(config: Config) -> Result<Self> {
        let location = StoreLocation::from_path(config.storage.path.clone());
        let store = location.open()?;
        Self::build(config, store, location)
    }

    /// Build the context over an existing store
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let location = StoreLocation::Shared(store.clone());
        Self::build(config, store, location)
    }

    /// Reopen the store at `location` and reload all persisted state
    pub fn reopen(config: Config, location: &StoreLocation) -> Result<Self> {
        let store = location.open()?;
        Self::build(config, store, location.clone())
    }

    fn build(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        location: StoreLocation,
    ) -> Result<Self> {
        let catalog = Catalog::builtin()?;
        let tracker = Tracker::load(store.clone(), &config.tracker);
        let completion = CompletionTracker::load(store.clone());
        let preferences = Preferences::load(store.clone());

        Ok(Self {
            config,
            store,
            catalog,
            tracker,
            completion,
            preferences,
            location,
        })
    }

    /// Where this context's store lives, for commands that release it
    pub fn store_location(&self) -> StoreLocation {
        self.location.clone()
    }

    /// Gateway built from the provider configuration
    pub fn gateway(&self) -> AiGateway {
        AiGateway::from_config(&self.config.provider)
    }

    /// Terminal notification sink honoring the configured permission
    pub fn notifier(&self) -> ConsoleNotifier {
        ConsoleNotifier::new(self.store.clone(), self.config.notifications.permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_with_store_uses_tracker_defaults() {
        let mut config = Config::default();
        config.tracker.calorie_goal = 1800;
        let app = App::with_store(config, Arc::new(MemoryStore::new())).unwrap();

        assert_eq!(app.tracker.calorie_goal(), 1800);
        assert!(!app.catalog.exercises().is_empty());
        assert!(app.completion.completed().is_empty());
    }

    #[test]
    fn test_open_with_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("store"));

        let app = App::open(config.clone()).unwrap();
        app.tracker.add_water(300);
        assert_eq!(app.tracker.water_intake(), 300);

        let location = app.store_location();
        drop(app);
        let reopened = App::reopen(config, &location).unwrap();
        assert_eq!(reopened.tracker.water_intake(), 300);
    }
}
