//! Local filesystem storage backend
//!
//! Each key is a `<key>.json` file in the base directory. All operations
//! complete immediately.

use super::{check_key, KeyValueStore, StorageError};
use std::path::{Path, PathBuf};

/// Application directory name under the platform data dir
const APP_DIR: &str = "pushbox";

/// Local filesystem storage backend
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    /// Create a backend under the platform data directory, or the current
    /// directory when the platform has none
    pub fn new() -> Self {
        Self::with_base_dir(default_data_dir())
    }

    /// Create a local storage backend with a custom base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File backing a key
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.base_dir.join(format!("{}.json", key)))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// `<platform data dir>/pushbox`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl KeyValueStore for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.resolve(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write to a sibling first so a failed write leaves the old value intact
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(key, path = %path.display(), bytes = value.len(), "storage write");
        Ok(())
    }
}
