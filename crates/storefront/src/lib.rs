//! Naqsh storefront library.
//!
//! Client-side core for the Naqsh marketplace: the shopper's cart and
//! wishlist (persisted locally as whole-collection JSON snapshots), the
//! catalog filter pipeline, and checkout against the marketplace order
//! API.
//!
//! # Example
//!
//! ```
//! use naqsh_core::{Price, ProductId};
//! use naqsh_storefront::Storefront;
//! use naqsh_storefront::models::ProductSnapshot;
//!
//! let storefront = Storefront::in_memory();
//! storefront.cart().add(ProductSnapshot {
//!     id: ProductId::from(1),
//!     name: "Anarkali Kurta".to_owned(),
//!     price: Price::from(4500_u32),
//!     image_url: None,
//!     store: None,
//! });
//! assert_eq!(storefront.cart().total(), Price::from(4500_u32));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod wishlist;

pub use error::{Result, StorefrontError};
pub use state::Storefront;
