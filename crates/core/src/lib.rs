//! Naqsh Core - Shared types library.
//!
//! This crate provides common types used across all Naqsh components:
//! - `storefront` - Customer-facing storefront core (cart, wishlist, catalog)
//! - Seller and admin surfaces consume the same identifiers and money type
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
