//! The assembled storefront, shared across a shopping session.

use std::sync::Arc;

use naqsh_core::ProductId;

use crate::cart::CartStore;
use crate::catalog::CatalogClient;
use crate::checkout::{self, HttpOrderGateway, OrderConfirmation, OrderDraft};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};
use crate::wishlist::WishlistStore;

/// One shopper's storefront: cart, wishlist, catalog, and checkout
/// wired over a single storage backend.
///
/// This struct is cheaply cloneable via `Arc`; clones share the same
/// stores, so a cart badge and a product page observe the same state.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    cart: CartStore,
    wishlist: WishlistStore,
    catalog: CatalogClient,
    orders: HttpOrderGateway,
}

impl Storefront {
    /// Assemble a storefront from environment configuration, persisting
    /// snapshots under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the data
    /// directory cannot be created.
    pub fn from_env() -> Result<Self> {
        let config = StorefrontConfig::from_env()?;
        Self::from_config(config)
    }

    /// Assemble a storefront over file-backed storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.data_dir)?);
        Ok(Self::with_storage(config, storage))
    }

    /// Assemble a storefront over an explicit storage backend.
    #[must_use]
    pub fn with_storage(config: StorefrontConfig, storage: Arc<dyn StorageBackend>) -> Self {
        let cart = CartStore::new(storage.clone());
        let wishlist = WishlistStore::new(storage);
        let catalog = CatalogClient::new(&config);
        let orders = HttpOrderGateway::new(&config);

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                cart,
                wishlist,
                catalog,
                orders,
            }),
        }
    }

    /// Ephemeral storefront over in-memory storage, with default
    /// configuration. Nothing survives the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_storage(StorefrontConfig::default(), Arc::new(MemoryStorage::new()))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shopper's cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the shopper's wishlist.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Move a wishlist entry into the cart.
    ///
    /// Adds one unit of the saved product to the cart (bumping an
    /// existing line by one, like any add) and removes the wishlist
    /// entry. Returns `false`, touching nothing, when the id is not on
    /// the wishlist.
    pub fn move_to_cart(&self, id: &ProductId) -> bool {
        let Some(entry) = self
            .inner
            .wishlist
            .entries()
            .into_iter()
            .find(|entry| entry.id == *id)
        else {
            return false;
        };

        self.inner.cart.add(entry.snapshot());
        self.inner.wishlist.remove(id);
        true
    }

    /// Place an order for the cart's current contents.
    ///
    /// Requires a configured API token. On success the cart is cleared
    /// and cached catalog data is invalidated (stock levels changed
    /// server-side); on failure the cart is left intact.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is configured, the cart is empty,
    /// or the order API rejects the submission.
    pub async fn checkout(&self, draft: OrderDraft) -> Result<OrderConfirmation> {
        let token = self.inner.config.require_token()?;
        let confirmation =
            checkout::place_order(&self.inner.cart, &self.inner.orders, token, draft).await?;
        self.inner.catalog.invalidate_all().await;
        Ok(confirmation)
    }
}
