//! Persistent key-value stores backing the durable cache tier
//!
//! A store only moves text around. Serializing cache entries to and from that text
//! is the cache's job, so stores can stay ignorant of entry layout.

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised by a persistent store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem operation failed
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Entry could not be encoded or decoded
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store refused the write (full, disabled, read-only)
    #[error("storage write rejected: {0}")]
    Rejected(String),
}

/// Text key-value store that survives process restarts
pub trait PersistentStore: Send + Sync + Debug {
    /// Returns the stored text for `key`, or `None` if absent
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every item this store owns
    fn clear(&self) -> Result<(), StorageError>;
}

/// Stores each key as a JSON file in a dedicated directory
///
/// Uses `~/.cache/ambucache/` on Linux, or the equivalent XDG path on other platforms.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a store in the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "ambucache")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a store rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the file for the given key
    fn item_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", encode_key(key)))
    }
}

impl PersistentStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.cache_dir)?;

        // Write atomically via a temp file unique to this write
        let mut file = NamedTempFile::new_in(&self.cache_dir)?;
        file.write_all(value.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.item_path(key)).map_err(|e| e.error)?;

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// Encodes a key as a file name, one name per key.
/// Lowercase ASCII letters, digits and '-' pass through; every other byte
/// (including '_' and uppercase) becomes `_xx` hex, so the mapping is reversible
/// and safe on case-insensitive filesystems.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("_{:02x}", byte)),
        }
    }
    encoded
}

/// In-process store, handy for tests and for running without a writable disk
///
/// Writes can be switched off to mimic a full or disabled storage backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set_item` fail with [`StorageError::Rejected`]
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistentStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("quota exceeded".to_string()));
        }
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.items().clear();
        Ok(())
    }
}
