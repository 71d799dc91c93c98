//! Durable key-value storage for the entity collections.
//!
//! Each collection is serialised as one JSON document under a fixed key. Two backends ship:
//!
//! - [`JsonDirStore`]: one `<key>.json` file per key inside a data directory. Writes go to a
//!   temporary sibling file which is then renamed over the target, so a crash mid-write leaves
//!   the previous document intact.
//! - [`MemoryStore`]: a mutex-guarded map for tests and throwaway runs.
//!
//! Multi-key writes go through [`write_all`], which restores already-written keys when a later
//! write fails.

use crate::constants::STORAGE_FILE_EXTENSION;
use crate::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A durable string-to-string map.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Returns the stored document, or `None` when the key was never written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// File-per-key storage inside a single directory.
#[derive(Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Opens (creating if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DataDirCreation`] if the directory cannot be created, or
    /// [`StoreError::InvalidInput`] if the path exists but is not a directory.
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(StoreError::DataDirCreation)?;
        if !dir.is_dir() {
            return Err(StoreError::InvalidInput(format!(
                "storage path is not a directory: {}",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self
            .dir
            .join(format!("{}.{}", key, STORAGE_FILE_EXTENSION)))
    }
}

impl KeyValueStore for JsonDirStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(key, path = %path.display(), "read storage key");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::StorageRead {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp_path = self
            .dir
            .join(format!(".{}.{}.tmp", key, STORAGE_FILE_EXTENSION));

        let write_error = |source| StoreError::StorageWrite {
            key: key.to_owned(),
            source,
        };

        fs::write(&tmp_path, value).map_err(write_error)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_error(e));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::StorageWrite {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

/// In-memory storage. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written String behind.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Keys become file names, so only `[a-z0-9_]` is allowed.
fn validate_key(key: &str) -> StoreResult<()> {
    let ok = !key.is_empty()
        && key
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_'));
    if !ok {
        return Err(StoreError::InvalidInput(format!(
            "storage key must be lowercase alphanumeric or '_', got: '{}'",
            key
        )));
    }
    Ok(())
}

/// Reads and decodes the document under `key`.
///
/// A missing key yields `fallback()`. A document that fails to decode also yields
/// `fallback()`; the corruption is logged and never returned to the caller.
pub(crate) fn load_or_else<V, F>(kv: &dyn KeyValueStore, key: &str, fallback: F) -> StoreResult<V>
where
    V: DeserializeOwned,
    F: FnOnce() -> V,
{
    let Some(raw) = kv.get(key)? else {
        tracing::debug!(key, "storage key absent, using seed data");
        return Ok(fallback());
    };

    match serde_json::from_str::<V>(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored data is malformed, reverting to seed data");
            Ok(fallback())
        }
    }
}

pub(crate) fn encode<V: serde::Serialize + ?Sized>(key: &str, value: &V) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Serialization {
        key: key.to_owned(),
        source,
    })
}

/// Writes every `(key, document)` pair in order.
///
/// If any write fails, keys already written are restored to their previous documents (or
/// removed if they had none) in reverse order, and the original error is returned. If a restore
/// also fails, [`StoreError::RollbackFailed`] carries both errors.
pub(crate) fn write_all(kv: &dyn KeyValueStore, writes: &[(&str, String)]) -> StoreResult<()> {
    let mut written: Vec<(&str, Option<String>)> = Vec::new();

    let result: StoreResult<()> = (|| {
        for (key, document) in writes {
            let previous = kv.get(key)?;
            kv.set(key, document)?;
            written.push((key, previous));
        }
        Ok(())
    })();

    let Err(write_error) = result else {
        return Ok(());
    };

    for (key, previous) in written.iter().rev() {
        let restored = match previous {
            Some(document) => kv.set(key, document),
            None => kv.remove(key),
        };
        if let Err(restore_error) = restored {
            tracing::warn!(
                key,
                error = %restore_error,
                "failed to restore storage key after write error"
            );
            return Err(StoreError::RollbackFailed {
                key: (*key).to_owned(),
                write_error: Box::new(write_error),
                restore_error: Box::new(restore_error),
            });
        }
    }

    Err(write_error)
}
