//! Tour Guide Storage
//!
//! Local key-value storage. Values are opaque strings; callers choose the
//! encoding.

mod storage;

pub use storage::Storage;

/// Storage error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Invalid value for key {key:?}")]
    InvalidValue { key: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal string key-value store, in the shape of `localStorage`
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;

    fn clear(&mut self) -> Result<(), StorageError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        (**self).clear()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
