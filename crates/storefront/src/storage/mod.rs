//! Durable local key-value storage.
//!
//! The browser storefront kept its state in `localStorage`: string keys mapped
//! to JSON strings, read and written synchronously. [`LocalStorage`] is that
//! contract. [`FileStorage`] persists each key as a file in a data directory
//! so state survives between runs; [`MemoryStorage`] keeps everything in
//! process for tests and throwaway sessions.
//!
//! Stores never interpret a missing key as an error: `get_item` returns
//! `Ok(None)` and the caller starts from its empty state.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage keys shared with the browser storefront.
pub mod keys {
    /// Serialized cart state.
    pub const CART: &str = "cart";

    /// Serialized list of favorite product ids.
    pub const FAVORITES: &str = "favorites";

    /// Bearer token obtained at login.
    pub const TOKEN: &str = "token";
}

/// Errors that can occur while reading or writing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded for storage.
    #[error("failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key cannot be used as a storage slot.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Synchronous string key-value storage.
pub trait LocalStorage {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: LocalStorage + ?Sized> LocalStorage for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Reject keys that are empty or could escape the storage namespace.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "key contains path characters: {key:?}"
        )));
    }
    if key.chars().any(char::is_control) {
        return Err(StorageError::InvalidKey(format!(
            "key contains control characters: {key:?}"
        )));
    }
    Ok(())
}
