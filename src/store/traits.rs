//! `KeyValueStore`: the browser-storage shaped persistence seam.

use crate::error::StorageError;

/// String key-value storage with local-storage semantics.
///
/// Synchronous on purpose: storage access is never a suspension point for
/// the wizard. Implementations must be cheap to share behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
