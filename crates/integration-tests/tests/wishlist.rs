//! Wishlist flows, including moving a saved product into the cart.

use naqsh_core::{Price, ProductId};
use naqsh_integration_tests::{fresh_storefront, snapshot};

// =============================================================================
// Saving Products
// =============================================================================

#[test]
fn test_saving_twice_keeps_a_single_entry() {
    let storefront = fresh_storefront();
    let wishlist = storefront.wishlist();

    let entries = wishlist.add(snapshot(7, "Banarasi Dupatta", 950));
    assert_eq!(entries.len(), 1);
    let first_saved_at = entries.first().expect("one entry").added_at;

    let entries = wishlist.add(snapshot(7, "Banarasi Dupatta", 950));
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries.first().expect("one entry").added_at,
        first_saved_at,
        "re-saving must not reset when the product was first saved"
    );
}

#[test]
fn test_contains_and_count_track_membership() {
    let storefront = fresh_storefront();
    let wishlist = storefront.wishlist();

    assert_eq!(wishlist.count(), 0);
    wishlist.add(snapshot(1, "Kurta", 4500));
    wishlist.add(snapshot(2, "Saree", 5500));

    assert!(wishlist.contains(&ProductId::from(1)));
    assert!(!wishlist.contains(&ProductId::from(3)));
    assert_eq!(wishlist.count(), 2);

    wishlist.remove(&ProductId::from(1));
    assert!(!wishlist.contains(&ProductId::from(1)));
    assert_eq!(wishlist.count(), 1);
}

#[test]
fn test_wishlist_and_cart_do_not_share_state() {
    let storefront = fresh_storefront();
    storefront.wishlist().add(snapshot(1, "Kurta", 4500));
    storefront.cart().add(snapshot(1, "Kurta", 4500));

    storefront.cart().remove(&ProductId::from(1));

    assert!(storefront.wishlist().contains(&ProductId::from(1)));
    assert_eq!(storefront.wishlist().count(), 1);
}

// =============================================================================
// Move To Cart
// =============================================================================

#[test]
fn test_move_to_cart_transfers_the_saved_snapshot() {
    let storefront = fresh_storefront();
    storefront.wishlist().add(snapshot(5, "Silk Saree", 12_000));

    assert!(storefront.move_to_cart(&ProductId::from(5)));

    assert!(!storefront.wishlist().contains(&ProductId::from(5)));
    let lines = storefront.cart().items();
    let line = lines.first().expect("one line");
    assert_eq!(line.id, ProductId::from(5));
    assert_eq!(line.price, Price::from(12_000_u32));
    assert_eq!(line.quantity, 1);
}

#[test]
fn test_move_to_cart_bumps_an_existing_line() {
    let storefront = fresh_storefront();
    storefront.cart().add(snapshot(5, "Silk Saree", 12_000));
    storefront.wishlist().add(snapshot(5, "Silk Saree", 12_000));

    assert!(storefront.move_to_cart(&ProductId::from(5)));

    let lines = storefront.cart().items();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.first().expect("one line").quantity, 2);
    assert_eq!(storefront.wishlist().count(), 0);
}

#[test]
fn test_move_to_cart_without_an_entry_changes_nothing() {
    let storefront = fresh_storefront();
    storefront.wishlist().add(snapshot(1, "Kurta", 4500));

    assert!(!storefront.move_to_cart(&ProductId::from(42)));

    assert_eq!(storefront.wishlist().count(), 1);
    assert!(storefront.cart().items().is_empty());
}
