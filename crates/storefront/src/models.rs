//! Domain models shared between the cart and wishlist stores.

use naqsh_core::{Price, ProductId};

/// The denormalized product fields copied into a cart line or wishlist
/// entry at add time.
///
/// Both stores freeze `name`, `price`, `image_url`, and `store` the moment
/// the shopper saves a product. The frozen copy is never reconciled with
/// the live catalog afterwards: if a seller reprices a kurta, carts that
/// already hold it keep the old price. That is a product decision, and
/// callers must not "fix" stale snapshots by re-fetching.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    /// Catalog identifier; the uniqueness key in both stores.
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: Option<String>,
    /// Opaque store summary attached by the catalog API, carried verbatim.
    pub store: Option<serde_json::Value>,
}
