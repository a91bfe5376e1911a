//! Shipping options shared across the marketplace surfaces.

use serde::{Deserialize, Serialize};

/// How an order should be delivered.
///
/// Maps to the order API's `shipping_method` values. Surcharges are not
/// encoded here; pricing belongs to whichever surface quotes the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Express => write!(f, "express"),
        }
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            _ => Err(format!("invalid shipping method: {s}")),
        }
    }
}
