//! The local persistence bridge: a key-value snapshot store.
//!
//! After every application-state change a sanitized snapshot is written
//! under [`STATE_KEY`]; at startup the same key is read back and, if it
//! passes a minimal shape check, becomes the initial state. The store
//! itself is a plain get/set-by-key capability: [`FileStore`] keeps one
//! JSON file per key under a directory, [`MemoryStore`] backs tests and
//! tools.

pub mod snapshot;

pub use snapshot::PersistedState;

use std::path::PathBuf;
use std::sync::Mutex;

use ahash::AHashMap;

use crate::error::SnapshotError;

/// The fixed key the application snapshot lives under.
pub const STATE_KEY: &str = "windmillChart";

/// A key-value store for state snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError>;
}

/// An in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<AHashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A store keeping one `<key>.json` file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}
