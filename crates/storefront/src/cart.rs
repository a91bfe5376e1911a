//! Shopping cart store.
//!
//! The cart is the shopper's authoritative local list of selected
//! products, persisted as a whole-collection JSON snapshot under
//! [`storage::keys::CART`]. Every mutating operation runs a full
//! read-modify-write cycle under a per-cart lock, persists the result,
//! and returns the updated list for the caller to render.
//!
//! Storage trouble never reaches callers: unreadable or corrupt snapshots
//! read as an empty cart, and failed writes degrade to in-memory state
//! with a logged warning. Nothing in the cart is worth crashing a
//! shopping session over.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::warn;

use naqsh_core::{Price, ProductId};

use crate::models::ProductSnapshot;
use crate::storage::{self, StorageBackend};

/// One cart line: a denormalized product snapshot plus a quantity.
///
/// The snapshot fields are frozen at add time (see [`ProductSnapshot`]).
/// `quantity` is at least 1 by construction; a line that would drop to
/// zero is deleted instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<serde_json::Value>,
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    fn first_unit(snapshot: ProductSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            price: snapshot.price,
            image_url: snapshot.image_url,
            store: snapshot.store,
            quantity: 1,
        }
    }
}

/// Handle to the shopper's cart.
///
/// Cheap to clone; all clones share one storage backend and one lock, so
/// concurrent mutations from different handles serialize instead of
/// losing updates.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    storage: Arc<dyn StorageBackend>,
    // Serializes read-modify-write cycles across handles. Plain reads
    // take a point-in-time snapshot and skip the lock.
    lock: Mutex<()>,
}

impl CartStore {
    /// Create a cart store over the given storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            inner: Arc::new(CartInner {
                storage,
                lock: Mutex::new(()),
            }),
        }
    }

    /// Current cart lines.
    ///
    /// Fails soft: a missing, unreadable, or corrupt snapshot reads as an
    /// empty cart.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        storage::load_snapshot(self.inner.storage.as_ref(), storage::keys::CART)
    }

    /// Add one unit of a product to the cart and return the updated lines.
    ///
    /// Adding always contributes exactly one unit: a product already in
    /// the cart has its quantity bumped by one, and a product not yet in
    /// the cart starts a new line at quantity 1. There is deliberately no
    /// quantity argument; call sites that offer a quantity picker follow
    /// up with [`update_quantity`](Self::update_quantity).
    pub fn add(&self, item: ProductSnapshot) -> Vec<CartLine> {
        let _guard = self.mutation_guard();
        let mut lines = self.items();
        if let Some(line) = lines.iter_mut().find(|line| line.id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            lines.push(CartLine::first_unit(item));
        }
        self.persist(&lines);
        lines
    }

    /// Remove the line for `id`, if present, and return the updated lines.
    ///
    /// Removing an id that is not in the cart is a no-op, not an error.
    pub fn remove(&self, id: &ProductId) -> Vec<CartLine> {
        let _guard = self.mutation_guard();
        let mut lines = self.items();
        lines.retain(|line| line.id != *id);
        self.persist(&lines);
        lines
    }

    /// Set the quantity for `id` and return the updated lines.
    ///
    /// A quantity of zero or less removes the line entirely. An id that is
    /// not in the cart is a no-op, not an error.
    pub fn update_quantity(&self, id: &ProductId, quantity: i64) -> Vec<CartLine> {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let _guard = self.mutation_guard();
        let mut lines = self.items();
        if let Some(line) = lines.iter_mut().find(|line| line.id == *id) {
            line.quantity = quantity;
            self.persist(&lines);
        }
        lines
    }

    /// Sum of `price * quantity` over all lines; zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items().iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines (not the number of lines).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items()
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Delete the persisted cart snapshot entirely.
    pub fn clear(&self) {
        let _guard = self.mutation_guard();
        if let Err(error) = self.inner.storage.remove(storage::keys::CART) {
            warn!(%error, "failed to clear cart snapshot");
        }
    }

    fn persist(&self, lines: &[CartLine]) {
        storage::persist_snapshot(self.inner.storage.as_ref(), storage::keys::CART, lines);
    }

    fn mutation_guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means another handle panicked mid-cycle;
        // snapshots are written whole, so continuing is safe.
        self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
