//! Unified error type for the storefront crate.
//!
//! Embedding applications can hold `Result<T, StorefrontError>` at their
//! outer seams; the per-module error enums remain available where finer
//! matching matters (retry on `CatalogError::RateLimited`, say).

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration loading or validation failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local snapshot storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;
