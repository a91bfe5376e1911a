//! Integration tests for Naqsh.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p naqsh-integration-tests
//! ```
//!
//! The suites exercise the assembled [`Storefront`] over in-memory or
//! temporary file-backed storage, with scripted order gateways where
//! checkout is involved. No marketplace server is required.
//!
//! # Test Categories
//!
//! - `cart` - Cart flows through the storefront facade
//! - `wishlist` - Wishlist flows, including move-to-cart
//! - `catalog` - Filter pipeline scenarios over a sample catalog
//! - `checkout` - Order submission against scripted gateways
//! - `persistence` - File-backed snapshot durability

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Once;

use chrono::{DateTime, Utc};

use naqsh_core::{Price, ProductId};
use naqsh_storefront::Storefront;
use naqsh_storefront::catalog::Product;
use naqsh_storefront::models::ProductSnapshot;

/// Route `tracing` output through the test harness. Safe to call from
/// every test; only the first call installs a subscriber.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Fresh storefront over in-memory storage and default configuration.
#[must_use]
pub fn fresh_storefront() -> Storefront {
    init_tracing();
    Storefront::in_memory()
}

/// Denormalized product snapshot, as a product page would hand to the
/// cart or wishlist.
#[must_use]
pub fn snapshot(id: i64, name: &str, price: u32) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::from(id),
        name: name.to_owned(),
        price: Price::from(price),
        image_url: Some(format!("/images/{id}.jpg")),
        store: None,
    }
}

/// A small catalog in the house style: festive wear across two stores.
#[must_use]
pub fn sample_catalog() -> Vec<Product> {
    vec![
        catalog_product(1, "Saree", "Banarasi silk saree with zari border", "Saree", 5500, 3),
        catalog_product(2, "Lehenga", "Embroidered bridal lehenga", "Lehenga", 8900, 1),
        catalog_product(3, "Anarkali Kurta", "Flared anarkali in chanderi", "Kurta", 4500, 4),
        catalog_product(4, "Silk Saree", "Kanjivaram silk saree", "Saree", 12_000, 2),
        catalog_product(5, "Dupatta", "Phulkari dupatta", "Dupatta", 950, 5),
    ]
}

fn catalog_product(
    id: i64,
    name: &str,
    description: &str,
    category: &str,
    price: u32,
    day: i64,
) -> Product {
    // Store 1 lists odd ids, store 2 even ids.
    let store_id = if id % 2 == 0 { 2 } else { 1 };
    Product {
        id: ProductId::from(id),
        name: name.to_owned(),
        description: Some(description.to_owned()),
        category: Some(category.to_owned()),
        price: Price::from(price),
        stock_quantity: Some(12),
        image_url: Some(format!("/images/{id}.jpg")),
        store: Some(serde_json::json!({ "id": store_id })),
        created_at: fixture_timestamp(day),
        updated_at: None,
    }
}

/// Deterministic timestamps a fixed number of days apart.
#[must_use]
pub fn fixture_timestamp(day: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + day * 86_400, 0).unwrap_or_default()
}
