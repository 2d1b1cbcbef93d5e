//! Durable key-value storage.
//!
//! The cart only needs the browser-storage contract: read a string by key,
//! overwrite a string by key. [`FileStorage`] keeps every key in one JSON
//! object on disk; [`MemoryStorage`] keeps them in process.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;
use tracing::{debug, instrument};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A value or the backing file could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A writer panicked while holding the lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String key-value storage with whole-value overwrite semantics.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FileStorage
// =============================================================================

/// Storage persisted as a single JSON object file.
///
/// Every `set_item` rewrites the whole file through a temporary sibling and
/// a rename, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStorage {
    /// Storage backed by `path`. The file is created on first write.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let data = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.read().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_map()?;
        Ok(map.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display(), bytes = value.len()))]
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.write().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        debug!("Storage item written");
        Ok(())
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// Storage held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one item.
    #[must_use]
    pub fn with_item(key: &str, value: &str) -> Self {
        let items = HashMap::from([(key.to_string(), value.to_string())]);
        Self {
            items: RwLock::new(items),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}
