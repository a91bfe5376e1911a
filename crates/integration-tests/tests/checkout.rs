//! Order submission against scripted gateways.
//!
//! The gateways here stand in for the order API so the flows around
//! them can run without a network: payload shape, totals, cart
//! clearing, and how rejections leave the session.

use std::sync::Mutex;

use naqsh_core::{
    AddressId, OrderId, PaymentMethodId, Price, ProductId, ShippingMethod, StoreId,
};
use naqsh_integration_tests::{fresh_storefront, snapshot};
use naqsh_storefront::checkout::{
    CheckoutError, OrderConfirmation, OrderDraft, OrderGateway, OrderRequest, PlacedOrder,
    place_order,
};
use secrecy::SecretString;

fn token() -> SecretString {
    SecretString::from("checkout-token".to_owned())
}

// =============================================================================
// Scripted Gateways
// =============================================================================

/// Accepts every submission and records what it was sent.
#[derive(Default)]
struct AcceptingGateway {
    seen: Mutex<Vec<OrderRequest>>,
}

impl OrderGateway for AcceptingGateway {
    async fn submit(
        &self,
        _token: &SecretString,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        self.seen.lock().expect("gateway lock").push(request.clone());
        Ok(OrderConfirmation {
            message: "Orders created successfully".to_owned(),
            orders: vec![PlacedOrder {
                order_id: OrderId::new(101),
                store_id: StoreId::new(1),
                amount: request.totals.total,
                items_count: u64::try_from(request.items.len()).expect("line count fits"),
            }],
            total_amount: request.totals.total,
            num_orders: 1,
        })
    }
}

/// Refuses every submission with a scripted rejection.
struct RejectingGateway {
    status: u16,
    message: &'static str,
}

impl OrderGateway for RejectingGateway {
    async fn submit(
        &self,
        _token: &SecretString,
        _request: &OrderRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        Err(CheckoutError::Rejected {
            status: self.status,
            message: self.message.to_owned(),
        })
    }
}

/// Fails the test if checkout ever reaches the network.
struct UnreachableGateway;

impl OrderGateway for UnreachableGateway {
    async fn submit(
        &self,
        _token: &SecretString,
        _request: &OrderRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        panic!("an empty cart must never reach the gateway");
    }
}

/// Splits the submission into one order per store, like the real API.
struct SplittingGateway;

impl OrderGateway for SplittingGateway {
    async fn submit(
        &self,
        _token: &SecretString,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        Ok(OrderConfirmation {
            message: "Orders created successfully".to_owned(),
            orders: vec![
                PlacedOrder {
                    order_id: OrderId::new(201),
                    store_id: StoreId::new(1),
                    amount: Price::from(4860_u32),
                    items_count: 1,
                },
                PlacedOrder {
                    order_id: OrderId::new(202),
                    store_id: StoreId::new(2),
                    amount: Price::from(5940_u32),
                    items_count: 1,
                },
            ],
            total_amount: request.totals.total,
            num_orders: 2,
        })
    }
}

// =============================================================================
// Placing Orders
// =============================================================================

#[tokio::test]
async fn test_successful_checkout_clears_the_cart() {
    let storefront = fresh_storefront();
    storefront.cart().add(snapshot(1, "Kurta", 4500));
    storefront.cart().add(snapshot(1, "Kurta", 4500));
    storefront.cart().add(snapshot(2, "Saree", 5500));

    let gateway = AcceptingGateway::default();
    let draft = OrderDraft::new(AddressId::new(11), PaymentMethodId::new(3));

    let confirmation = place_order(storefront.cart(), &gateway, &token(), draft)
        .await
        .expect("order accepted");

    assert_eq!(confirmation.num_orders, 1);
    assert!(storefront.cart().items().is_empty());
    assert_eq!(storefront.cart().total(), Price::ZERO);
}

#[tokio::test]
async fn test_request_carries_lines_and_standard_totals() {
    let storefront = fresh_storefront();
    storefront.cart().add(snapshot(1, "Kurta", 4500));
    storefront.cart().add(snapshot(1, "Kurta", 4500));
    storefront.cart().add(snapshot(2, "Saree", 5500));

    let gateway = AcceptingGateway::default();
    let draft = OrderDraft::new(AddressId::new(11), PaymentMethodId::new(3))
        .with_notes("Ring the bell twice");

    place_order(storefront.cart(), &gateway, &token(), draft)
        .await
        .expect("order accepted");

    let seen = gateway.seen.lock().expect("gateway lock");
    let request = seen.first().expect("one submission");
    assert_eq!(request.items.len(), 2);
    assert_eq!(request.shipping_address_id, AddressId::new(11));
    assert_eq!(request.payment_method_id, PaymentMethodId::new(3));
    assert_eq!(request.shipping_method, ShippingMethod::Standard);
    assert_eq!(request.notes, "Ring the bell twice");

    // 8% tax on 14,500 and free standard shipping.
    assert_eq!(request.totals.subtotal, Price::from(14_500_u32));
    assert_eq!(request.totals.tax, Price::from(1160_u32));
    assert_eq!(request.totals.shipping_cost, Price::ZERO);
    assert_eq!(request.totals.total, Price::from(15_660_u32));
}

#[tokio::test]
async fn test_express_shipping_adds_the_flat_surcharge() {
    let storefront = fresh_storefront();
    storefront.cart().add(snapshot(5, "Dupatta", 950));

    let gateway = AcceptingGateway::default();
    let draft = OrderDraft::new(AddressId::new(11), PaymentMethodId::new(3))
        .with_shipping_method(ShippingMethod::Express);

    place_order(storefront.cart(), &gateway, &token(), draft)
        .await
        .expect("order accepted");

    let seen = gateway.seen.lock().expect("gateway lock");
    let request = seen.first().expect("one submission");
    assert_eq!(request.totals.tax, Price::from(76_u32));
    assert_eq!(request.totals.shipping_cost, Price::from(15_u32));
    assert_eq!(request.totals.total, Price::from(1041_u32));
}

// =============================================================================
// Failure Paths
// =============================================================================

#[tokio::test]
async fn test_rejected_checkout_keeps_the_cart() {
    let storefront = fresh_storefront();
    storefront.cart().add(snapshot(1, "Kurta", 4500));

    let gateway = RejectingGateway {
        status: 400,
        message: "Address not found",
    };
    let draft = OrderDraft::new(AddressId::new(99), PaymentMethodId::new(3));

    let err = place_order(storefront.cart(), &gateway, &token(), draft)
        .await
        .expect_err("rejection surfaces");

    match err {
        CheckoutError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Address not found");
        }
        other => panic!("unexpected error: {other}"),
    }

    let lines = storefront.cart().items();
    assert_eq!(lines.first().expect("line survives").id, ProductId::from(1));
    assert_eq!(storefront.cart().total(), Price::from(4500_u32));
}

#[tokio::test]
async fn test_empty_cart_never_reaches_the_gateway() {
    let storefront = fresh_storefront();
    let draft = OrderDraft::new(AddressId::new(11), PaymentMethodId::new(3));

    let err = place_order(storefront.cart(), &UnreachableGateway, &token(), draft)
        .await
        .expect_err("empty cart is rejected locally");

    assert!(matches!(err, CheckoutError::EmptyCart));
}

// =============================================================================
// Multi-Store Confirmations
// =============================================================================

#[tokio::test]
async fn test_confirmation_reports_one_order_per_store() {
    let storefront = fresh_storefront();
    storefront.cart().add(snapshot(1, "Kurta", 4500));
    storefront.cart().add(snapshot(2, "Saree", 5500));

    let draft = OrderDraft::new(AddressId::new(11), PaymentMethodId::new(3));
    let confirmation = place_order(storefront.cart(), &SplittingGateway, &token(), draft)
        .await
        .expect("orders accepted");

    assert_eq!(confirmation.num_orders, 2);
    assert_eq!(confirmation.orders.len(), 2);
    let split: Price = confirmation
        .orders
        .iter()
        .map(|order| order.amount)
        .sum();
    assert_eq!(split, confirmation.total_amount);
    assert!(storefront.cart().items().is_empty());
}
