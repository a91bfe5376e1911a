//! Core types for Naqsh.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod shipping;

pub use id::*;
pub use price::{Price, PriceError};
pub use shipping::ShippingMethod;
