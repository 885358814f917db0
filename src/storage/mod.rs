//! Local key-value persistence
//!
//! Every persisted value in FitBot is a JSON document stored under a string
//! key. The [`KeyValueStore`] trait is the narrow seam over the backing
//! store: [`SledStore`] is the embedded on-disk store used by the CLI and
//! [`MemoryStore`] is the in-memory fake used in tests.
//!
//! [`load`] and [`save`] are the typed helpers used uniformly by the rest of
//! the crate. They never fail: decode problems fall back to the caller's
//! default and write problems are logged.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

pub mod keys;
pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// Byte-oriented key-value store
///
/// Implementations must be safe to share between the owning views and the
/// background timer tasks.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw bytes stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value stored under `key` (no-op if absent)
    fn remove(&self, key: &str) -> Result<()>;
}

/// Load a typed value, falling back to `default`
///
/// Absence of the key, a read failure, or a JSON decode failure all yield
/// `default`. Failures are logged, never returned.
///
/// # Examples
///
/// ```
/// use fitbot::storage::{load, save, MemoryStore};
///
/// let store = MemoryStore::new();
/// assert_eq!(load(&store, "calorieTrackerGoal", 2000u32), 2000);
///
/// save(&store, "calorieTrackerGoal", &1800u32);
/// assert_eq!(load(&store, "calorieTrackerGoal", 2000u32), 1800);
/// ```
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return default,
        Err(e) => {
            tracing::warn!(key, "Failed to read stored value, using default: {}", e);
            return default;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, "Failed to decode stored value, using default: {}", e);
            default
        }
    }
}

/// Serialize and store a value
///
/// Returns `true` when the value was written. Serialization and storage
/// failures are logged and reported as `false`; they are never propagated.
pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(key, "Failed to serialize value: {}", e);
            return false;
        }
    };

    match store.set(key, &bytes) {
        Ok(()) => {
            tracing::trace!(key, bytes = bytes.len(), "Persisted value");
            true
        }
        Err(e) => {
            tracing::error!(key, "Failed to save value: {}", e);
            false
        }
    }
}

/// Where a command finds its store
///
/// Long-running commands keep a location instead of an open store and
/// reopen it for each read, so other invocations can take the on-disk lock
/// in between.
#[derive(Clone)]
pub enum StoreLocation {
    /// The platform data directory, or `FITBOT_STORAGE_PATH`
    Default,
    /// An explicit database path
    Path(PathBuf),
    /// A store already open in this process
    Shared(Arc<dyn KeyValueStore>),
}

impl std::fmt::Debug for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreLocation::Default => write!(f, "Default"),
            StoreLocation::Path(path) => f.debug_tuple("Path").field(path).finish(),
            StoreLocation::Shared(_) => write!(f, "Shared"),
        }
    }
}

impl StoreLocation {
    /// Location for an optional configured path
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => StoreLocation::Path(path),
            None => StoreLocation::Default,
        }
    }

    /// Open the store; the on-disk lock is held until the returned handle drops
    ///
    /// # Errors
    ///
    /// Returns `FitbotError::Storage` if the database cannot be opened
    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(match self {
            StoreLocation::Default => Arc::new(SledStore::open_default()?),
            StoreLocation::Path(path) => Arc::new(SledStore::open(path)?),
            StoreLocation::Shared(store) => store.clone(),
        })
    }
}
