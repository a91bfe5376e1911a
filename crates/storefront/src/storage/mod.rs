//! Durable key-value storage substrate for the cart and wishlist stores.
//!
//! The stores persist whole-collection JSON snapshots under well-known
//! keys. The substrate itself only moves strings: serialization and the
//! fail-soft handling of corrupt snapshots belong to the stores, which is
//! where the recovery policy lives. All operations are synchronous; the
//! stores guard their read-modify-write cycles with their own locks.

mod file;
mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Well-known storage keys.
pub mod keys {
    /// Persisted cart snapshot: a JSON array of cart lines.
    pub const CART: &str = "cart";
    /// Persisted wishlist snapshot: a JSON array of wishlist entries.
    pub const WISHLIST: &str = "wishlist";
}

/// Errors surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed (disk full, permissions, ...).
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key is empty or not safe to use as a file name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The backend is unusable (e.g. its state was poisoned).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A durable string key-value store.
///
/// Implementations must serialize access internally so that a single
/// `get`/`set`/`remove` is consistent, but they are not required to make
/// a read-modify-write sequence atomic; the stores layer their own
/// per-collection lock on top for that.
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written durably.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Deleting an absent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and deserialize a whole-collection snapshot, failing soft.
///
/// Missing keys, unreadable storage, and corrupt JSON all come back as an
/// empty collection. Corruption is logged and the bad snapshot is left in
/// place until the next write replaces it.
pub(crate) fn load_snapshot<T: DeserializeOwned>(
    storage: &dyn StorageBackend,
    key: &str,
) -> Vec<T> {
    match storage.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(error) => {
                warn!(key, %error, "corrupt snapshot in storage, treating as empty");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(error) => {
            warn!(key, %error, "storage read failed, treating as empty");
            Vec::new()
        }
    }
}

/// Serialize and persist a whole-collection snapshot, failing soft.
///
/// A write failure (quota, permissions) is logged as a warning and
/// otherwise absorbed: the caller keeps its updated in-memory state and
/// the shopper keeps working, with persistence degraded until the next
/// successful write.
pub(crate) fn persist_snapshot<T: Serialize>(
    storage: &dyn StorageBackend,
    key: &str,
    items: &[T],
) {
    match serde_json::to_string(items) {
        Ok(raw) => {
            if let Err(error) = storage.set(key, &raw) {
                warn!(key, %error, "storage write failed, keeping in-memory state");
            }
        }
        Err(error) => {
            warn!(key, %error, "snapshot serialization failed, nothing persisted");
        }
    }
}
