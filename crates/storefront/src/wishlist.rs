//! Wishlist store.
//!
//! A deduplicated set of saved products, persisted as a whole-collection
//! JSON snapshot under [`storage::keys::WISHLIST`]. Same persistence and
//! failure contract as the cart store: read-modify-write under a
//! per-collection lock, soft-fail reads, logged-and-absorbed write
//! failures.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use naqsh_core::{Price, ProductId};

use crate::models::ProductSnapshot;
use crate::storage::{self, StorageBackend};

/// One saved product.
///
/// The snapshot fields are frozen at save time (see [`ProductSnapshot`]).
/// `added_at` records when the shopper saved the product and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<serde_json::Value>,
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    /// The denormalized product fields, e.g. for moving this entry into
    /// the cart.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            store: self.store.clone(),
        }
    }

    fn saved_now(snapshot: ProductSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            price: snapshot.price,
            image_url: snapshot.image_url,
            store: snapshot.store,
            added_at: Utc::now(),
        }
    }
}

/// Handle to the shopper's wishlist.
///
/// Cheap to clone; all clones share one storage backend and one lock.
#[derive(Clone)]
pub struct WishlistStore {
    inner: Arc<WishlistInner>,
}

struct WishlistInner {
    storage: Arc<dyn StorageBackend>,
    lock: Mutex<()>,
}

impl WishlistStore {
    /// Create a wishlist store over the given storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            inner: Arc::new(WishlistInner {
                storage,
                lock: Mutex::new(()),
            }),
        }
    }

    /// Current wishlist entries.
    ///
    /// Fails soft: a missing, unreadable, or corrupt snapshot reads as an
    /// empty wishlist.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        storage::load_snapshot(self.inner.storage.as_ref(), storage::keys::WISHLIST)
    }

    /// Save a product, stamping it with the current time, and return the
    /// updated entries.
    ///
    /// The wishlist is a set: saving a product that is already saved is a
    /// no-op and keeps the original `added_at`.
    pub fn add(&self, item: ProductSnapshot) -> Vec<WishlistEntry> {
        let _guard = self.mutation_guard();
        let mut entries = self.entries();
        if entries.iter().any(|entry| entry.id == item.id) {
            return entries;
        }
        entries.push(WishlistEntry::saved_now(item));
        self.persist(&entries);
        entries
    }

    /// Remove the entry for `id`, if present, and return the updated
    /// entries.
    ///
    /// Removing an id that is not saved is a no-op, not an error.
    pub fn remove(&self, id: &ProductId) -> Vec<WishlistEntry> {
        let _guard = self.mutation_guard();
        let mut entries = self.entries();
        entries.retain(|entry| entry.id != *id);
        self.persist(&entries);
        entries
    }

    /// Whether `id` is currently saved. Reads the persisted snapshot fresh
    /// on every call rather than caching membership.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.entries().iter().any(|entry| entry.id == *id)
    }

    /// Number of saved entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries().len()
    }

    fn persist(&self, entries: &[WishlistEntry]) {
        storage::persist_snapshot(
            self.inner.storage.as_ref(),
            storage::keys::WISHLIST,
            entries,
        );
    }

    fn mutation_guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
