//! Calculator state persistence.
//!
//! Each calculator stores its whole state as one JSON blob under a fixed key.
//! Saving and loading never fail the caller: errors are logged and treated as
//! "save skipped" or "no saved state".

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StorageError;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "Shipquote";
const APP_NAME: &str = "shipquote";

/// Opaque key/value text store
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One file per key (`<key>.json`) inside a state directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform config directory.
    pub fn in_project_dir() -> Result<Self, StorageError> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| Self::new(dirs.config_dir()))
            .ok_or(StorageError::Unavailable)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values.lock().map_err(|_| StorageError::Unavailable)
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Saved blob: the state plus when it was written
#[derive(Debug, Serialize, Deserialize)]
pub struct Persisted<T> {
    pub saved_at: DateTime<Utc>,
    pub state: T,
}

fn try_save<T: Serialize>(store: &dyn StateStore, key: &str, state: &T) -> Result<(), StorageError> {
    let blob = Persisted {
        saved_at: Utc::now(),
        state,
    };
    store.set(key, &serde_json::to_string(&blob)?)
}

fn try_load<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Result<Option<T>, StorageError> {
    let Some(text) = store.get(key)? else {
        return Ok(None);
    };
    let blob: Persisted<T> = serde_json::from_str(&text)?;
    debug!("Loaded {} saved at {}", key, blob.saved_at);
    Ok(Some(blob.state))
}

/// Save `state` under `key`; returns whether the save happened.
pub fn save_state<T: Serialize>(store: &dyn StateStore, key: &str, state: &T) -> bool {
    match try_save(store, key, state) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save {}: {}", key, e);
            false
        }
    }
}

/// Load the state saved under `key`; unreadable state counts as none.
pub fn load_state<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    match try_load(store, key) {
        Ok(state) => state,
        Err(e) => {
            warn!("Failed to load {}: {}", key, e);
            None
        }
    }
}

pub fn clear_state(store: &dyn StateStore, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!("Failed to clear {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::session::paint::{PaintCalculator, STORAGE_KEY};

    /// Store whose every operation fails
    struct BrokenStore;

    impl StateStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_memory_round_trip() {
        let store = MemoryStore::new();
        let catalog = Catalog::embedded().unwrap();
        let mut calc = PaintCalculator::new();
        calc.add_work(&catalog).unwrap();

        assert!(save_state(&store, STORAGE_KEY, &calc));
        let loaded: PaintCalculator = load_state(&store, STORAGE_KEY).unwrap();
        assert_eq!(loaded, calc);

        clear_state(&store, STORAGE_KEY);
        assert!(load_state::<PaintCalculator>(&store, STORAGE_KEY).is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp.path().join("state"));

        assert_eq!(store.get("missing").unwrap(), None);
        assert!(save_state(&store, "numbers", &vec![1, 2, 3]));
        assert!(temp.path().join("state/numbers.json").exists());

        let loaded: Vec<i32> = load_state(&store, "numbers").unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);

        clear_state(&store, "numbers");
        clear_state(&store, "numbers");
        assert_eq!(store.get("numbers").unwrap(), None);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let store = BrokenStore;
        assert!(!save_state(&store, STORAGE_KEY, &PaintCalculator::new()));
        assert!(load_state::<PaintCalculator>(&store, STORAGE_KEY).is_none());
        clear_state(&store, STORAGE_KEY);
    }

    #[test]
    fn test_corrupt_state_loads_as_none() {
        let store = MemoryStore::new();
        store.set(STORAGE_KEY, "{ not json").unwrap();
        assert!(load_state::<PaintCalculator>(&store, STORAGE_KEY).is_none());
    }
}
