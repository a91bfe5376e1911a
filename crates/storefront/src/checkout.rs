//! Checkout handoff to the marketplace order API.
//!
//! Checkout is the one moment the cart leaves the client: the snapshot
//! from [`CartStore::items`] is POSTed wholesale to the order API, which
//! splits it into one order per store. Totals are computed client-side
//! from the snapshot and sent along; the API apportions them rather than
//! recomputing.
//!
//! The cart is cleared only after the API confirms the order. Any
//! failure leaves it intact so the shopper can retry.

use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use naqsh_core::{AddressId, OrderId, PaymentMethodId, Price, ShippingMethod, StoreId};

use crate::cart::{CartLine, CartStore};
use crate::config::StorefrontConfig;

/// Tax rate applied to the merchandise subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2); // 0.08

/// Flat surcharge, in whole currency units, for express delivery.
pub const EXPRESS_SHIPPING_SURCHARGE: u32 = 15;

/// Shipping cost for the chosen method. Standard delivery is free.
#[must_use]
pub fn shipping_surcharge(method: ShippingMethod) -> Price {
    match method {
        ShippingMethod::Standard => Price::ZERO,
        ShippingMethod::Express => Price::from(EXPRESS_SHIPPING_SURCHARGE),
    }
}

/// Order totals computed from the cart snapshot at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub tax: Price,
    pub shipping_cost: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Compute totals for a merchandise subtotal and shipping choice.
    /// Tax is 8% of the subtotal, rounded to two decimal places.
    #[must_use]
    pub fn compute(subtotal: Price, shipping_method: ShippingMethod) -> Self {
        let tax = subtotal.apply_rate(TAX_RATE);
        let shipping_cost = shipping_surcharge(shipping_method);
        Self {
            subtotal,
            tax,
            shipping_cost,
            total: subtotal + tax + shipping_cost,
        }
    }
}

/// The shopper's checkout-form choices, collected before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub shipping_address_id: AddressId,
    pub payment_method_id: PaymentMethodId,
    pub shipping_method: ShippingMethod,
    pub notes: String,
}

impl OrderDraft {
    /// Draft with standard shipping and no notes.
    #[must_use]
    pub fn new(shipping_address_id: AddressId, payment_method_id: PaymentMethodId) -> Self {
        Self {
            shipping_address_id,
            payment_method_id,
            shipping_method: ShippingMethod::default(),
            notes: String::new(),
        }
    }

    #[must_use]
    pub const fn with_shipping_method(mut self, method: ShippingMethod) -> Self {
        self.shipping_method = method;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Wire payload POSTed to the order API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub items: Vec<CartLine>,
    pub shipping_address_id: AddressId,
    pub payment_method_id: PaymentMethodId,
    pub shipping_method: ShippingMethod,
    pub notes: String,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

/// One per-store order carved out of a checkout by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub store_id: StoreId,
    pub amount: Price,
    pub items_count: u64,
}

/// Successful response from the order API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderConfirmation {
    #[serde(default)]
    pub message: String,
    pub orders: Vec<PlacedOrder>,
    pub total_amount: Price,
    pub num_orders: u64,
}

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API refused the order.
    #[error("Order rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Submits assembled orders to the order API.
///
/// A trait seam so checkout logic can be exercised against a fake
/// gateway; callers go through a generic bound, not a trait object.
pub trait OrderGateway: Send + Sync {
    /// Submit the order on behalf of the bearer of `token`.
    fn submit(
        &self,
        token: &SecretString,
        request: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, CheckoutError>> + Send;
}

/// [`OrderGateway`] over the marketplace REST API.
#[derive(Clone)]
pub struct HttpOrderGateway {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpOrderGateway {
    /// Create a gateway pointed at the configured order endpoint.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/orders", config.api_base_url),
            timeout: config.http_timeout,
        }
    }
}

impl OrderGateway for HttpOrderGateway {
    async fn submit(
        &self,
        token: &SecretString,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .bearer_auth(token.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Order API rejected the order"
            );
            return Err(CheckoutError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&response_text),
            });
        }

        match serde_json::from_str(&response_text) {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse order API response"
                );
                Err(CheckoutError::Parse(e))
            }
        }
    }
}

/// Pull the human-readable message out of an order API error body,
/// which is `{"message": ...}`. Falls back to the raw body, truncated.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(ToOwned::to_owned))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Place an order for the cart's current contents.
///
/// Snapshots the cart, computes totals, and submits through the gateway.
/// On success, and only on success, the cart is cleared. An empty cart
/// short-circuits to [`CheckoutError::EmptyCart`] without calling the
/// gateway.
///
/// # Errors
///
/// Returns an error if the cart is empty or submission fails; the cart
/// is left intact in both cases.
#[instrument(skip_all, fields(shipping_method = %draft.shipping_method))]
pub async fn place_order<G: OrderGateway>(
    cart: &CartStore,
    gateway: &G,
    token: &SecretString,
    draft: OrderDraft,
) -> Result<OrderConfirmation, CheckoutError> {
    let items = cart.items();
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let subtotal = items.iter().map(CartLine::line_total).sum();
    let request = OrderRequest {
        totals: OrderTotals::compute(subtotal, draft.shipping_method),
        items,
        shipping_address_id: draft.shipping_address_id,
        payment_method_id: draft.payment_method_id,
        shipping_method: draft.shipping_method,
        notes: draft.notes,
    };

    let confirmation = gateway.submit(token, &request).await?;

    info!(
        num_orders = confirmation.num_orders,
        total = %confirmation.total_amount,
        "Orders placed"
    );
    cart.clear();

    Ok(confirmation)
}
