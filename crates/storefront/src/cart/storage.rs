//! Durable key-value slots for the persisted cart.
//!
//! [`CartStorage`] is the port the cart store commits through. The store
//! never depends on a concrete backend, so its logic is testable against
//! [`MemoryStorage`] and deployed against [`FileStorage`].

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used as a slot name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Writing the value would exceed the backend's capacity.
    #[error("Storage quota exceeded: need {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },
}

/// A durable string slot store.
pub trait CartStorage: Send + Sync {
    /// Read a slot. Returns `Ok(None)` if nothing has been saved under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage, optionally capped at a byte quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create unbounded in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create in-memory storage that rejects values over `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Seed a slot directly, bypassing the quota.
    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota
            && value.len() > quota
        {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                quota,
            });
        }
        self.insert(key, value);
        Ok(())
    }
}

/// One JSON file per key under a directory.
///
/// Writes go to a temporary file that is renamed over the slot, so a crash
/// mid-write never leaves a truncated cart behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store slots under `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let tmp = self
            .dir
            .join(format!(".{key}.{}.tmp", uuid::Uuid::new_v4().simple()));
        std::fs::write(&tmp, value)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}
