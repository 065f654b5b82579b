//! Storage Abstraction Layer
//!
//! Levels and the remembered author name live in a small key-value store.
//! - `local`: one JSON file per key under the data directory (native)
//! - `MemoryStorage`: in-process map (web builds and tests)
//! - `levels`: the saved-level list on top of either backend

pub mod levels;
#[cfg(not(target_arch = "wasm32"))]
pub mod local;

use std::collections::HashMap;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
pub use local::LocalStorage;

/// Storage error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Key contains characters that cannot be used as a file name
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("serialization error: {0}")]
    SerdeError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(e.to_string()),
            _ => StorageError::IoError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerdeError(e.to_string())
    }
}

/// A string-valued key-value store
///
/// Reads of a key that was never written return `Ok(None)`.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// Keys must be usable as plain file names on every backend
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// In-memory store, lost when the process exits
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut store = MemoryStorage::new();
        assert_eq!(store.read("pushbox.authorName").unwrap(), None);
        store.write("pushbox.authorName", "\"Ada\"").unwrap();
        assert_eq!(store.read("pushbox.authorName").unwrap().as_deref(), Some("\"Ada\""));
    }

    #[test]
    fn test_rejects_path_keys() {
        let mut store = MemoryStorage::new();
        assert!(matches!(store.write("../etc", "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.read("a/b"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.read(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_boxed_store() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStorage::new());
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v"));
    }
}
