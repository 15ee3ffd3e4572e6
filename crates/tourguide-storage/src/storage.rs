//! Storage backends
//!
//! Session (in-memory) and local (file-backed) storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{KeyValueStore, StorageError};

/// Storage backend
#[derive(Debug, Default)]
pub struct Storage {
    data: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Storage {
    /// Create in-memory storage
    pub fn session() -> Self {
        Self::default()
    }

    /// Create persistent storage backed by `path`.
    ///
    /// A missing file starts empty. An unreadable one also starts empty;
    /// the next write replaces it.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut storage = Self {
            data: BTreeMap::new(),
            path: Some(path.clone()),
        };

        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    for line in contents.lines() {
                        if let Some((key, value)) = line.split_once('\t') {
                            storage.data.insert(key.to_string(), value.to_string());
                        }
                    }
                    tracing::debug!("Loaded {} entries from {}", storage.data.len(), path.display());
                }
                Err(err) => {
                    tracing::warn!("Could not read storage file {}: {}", path.display(), err);
                }
            }
        }

        storage
    }

    /// Backing file, if persistent
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Get key at index (keys are sorted)
    pub fn key(&self, index: usize) -> Option<&str> {
        self.data.keys().nth(index).map(|s| s.as_str())
    }

    /// Persist to disk if persistent
    fn persist(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut contents = String::new();
        for (key, value) in &self.data {
            contents.push_str(key);
            contents.push('\t');
            contents.push_str(value);
            contents.push('\n');
        }
        fs::write(path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains(['\t', '\n', '\r']) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        if value.contains(['\n', '\r']) {
            return Err(StorageError::InvalidValue { key: key.to_string() });
        }

        self.data.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.data.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.data.clear();
        self.persist()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
