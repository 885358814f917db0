//! Embedded on-disk key-value store
//!
//! Persists values in a `sled` database under the user's data directory
//! (or an explicit path). Every write is flushed so a crash never loses the
//! last change.

use super::KeyValueStore;
use crate::error::{FitbotError, Result};
use directories::ProjectDirs;
use sled::Db;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the default database location
pub const STORAGE_PATH_ENV: &str = "FITBOT_STORAGE_PATH";

/// Attempts made while another process holds the database lock
const LOCK_ATTEMPTS: u32 = 40;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Key-value store backed by an embedded `sled` database
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    path: PathBuf,
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("path", &self.path)
            .finish()
    }
}

impl SledStore {
    /// Open the store at the default location
    ///
    /// Honors the `FITBOT_STORAGE_PATH` environment variable; otherwise the
    /// database lives in the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns `FitbotError::Storage` if the data directory cannot be
    /// determined or the database cannot be opened
    pub fn open_default() -> Result<Self> {
        if let Ok(override_path) = std::env::var(STORAGE_PATH_ENV) {
            return Self::open(override_path);
        }

        Self::open(default_storage_path()?)
    }

    /// Open or create a store at `path`
    ///
    /// Another FitBot process may hold the database briefly; opening waits
    /// up to two seconds for its lock before failing.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitbot::storage::{KeyValueStore, SledStore};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SledStore::open(dir.path().join("store")).unwrap();
    /// store.set("theme", b"\"dark\"").unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FitbotError::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let db = open_db(&path)
            .map_err(|e| FitbotError::Storage(format!("Failed to open database: {}", e)))?;

        tracing::debug!("Opened key-value store at {}", path.display());
        Ok(Self { db, path })
    }

    /// Location of the database on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_db(path: &Path) -> sled::Result<Db> {
    let mut attempt = 1;
    loop {
        match sled::open(path) {
            Err(sled::Error::Io(e))
                if e.kind() == std::io::ErrorKind::WouldBlock && attempt < LOCK_ATTEMPTS =>
            {
                tracing::debug!(attempt, "Database locked by another process, retrying");
                attempt += 1;
                std::thread::sleep(LOCK_RETRY_DELAY);
            }
            result => return result,
        }
    }
}

/// Default database location inside the platform data directory
pub fn default_storage_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "fitbot", "fitbot")
        .ok_or_else(|| FitbotError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("store"))
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| FitbotError::Storage(format!("Get failed: {}", e)))?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| FitbotError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| FitbotError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| FitbotError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| FitbotError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, load, save};
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_sled_store_round_trip_through_clone() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(dir.path().join("store")).unwrap();
        assert!(save(&store, keys::HYDRATION_GOAL, &3000u32));

        let shared = store.clone();
        assert_eq!(load(&shared, keys::HYDRATION_GOAL, 2500u32), 3000);
    }

    #[test]
    fn test_sled_store_remove() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(dir.path().join("store")).unwrap();

        store.set("k", b"1").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_open_waits_for_released_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store");
        let holder = SledStore::open(&path).unwrap();
        holder.set("k", b"1").unwrap();

        let release = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            drop(holder);
        });

        let store = SledStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"1".to_vec()));
        release.join().unwrap();
    }

    #[test]
    #[serial]
    fn test_open_default_respects_env_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store");
        std::env::set_var(STORAGE_PATH_ENV, path.to_string_lossy().to_string());

        let store = SledStore::open_default().expect("open_default failed with env override");
        assert_eq!(store.path(), path.as_path());
        assert!(path.parent().unwrap().exists());

        std::env::remove_var(STORAGE_PATH_ENV);
    }
}
