//! Login, logout and change notifications across views.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use pocket_bazaar_integration_tests::{TestContext, product};
use pocket_bazaar_storefront::{ChangeEvent, StorefrontError};

#[test]
fn test_logout_clears_session_and_cart() {
    let mut ctx = TestContext::new();
    ctx.shop.login("shopper@example.com").unwrap();
    ctx.shop.add_product(&product(1, "10.00")).unwrap();

    ctx.shop.logout().unwrap();
    assert_eq!(ctx.shop.session().current(), None);
    assert!(ctx.shop.cart().snapshot().is_empty());
    assert!(matches!(
        ctx.shop.add_product(&product(1, "10.00")),
        Err(StorefrontError::Unauthenticated)
    ));

    ctx.restart();
    assert_eq!(ctx.shop.session().current(), None);
    assert!(ctx.shop.cart().snapshot().is_empty());
}

#[test]
fn test_cart_does_not_leak_to_next_shopper() {
    let ctx = TestContext::new();
    ctx.shop.login("alice@example.com").unwrap();
    ctx.shop.add_product(&product(1, "10.00")).unwrap();
    ctx.shop.logout().unwrap();

    ctx.shop.login("bob@example.com").unwrap();
    assert!(ctx.shop.cart().snapshot().is_empty());
}

#[test]
fn test_logout_in_other_process_is_observed() {
    let ctx = TestContext::new();
    ctx.shop.login("shopper@example.com").unwrap();
    ctx.shop.add_product(&product(1, "10.00")).unwrap();
    assert_eq!(ctx.shop.cart().total_items(), 1);

    let other = ctx.second_process();
    other.logout().unwrap();

    assert_eq!(ctx.shop.session().current(), None);
    assert!(ctx.shop.cart().snapshot().is_empty());
}

#[test]
fn test_views_are_notified_after_writes() {
    let ctx = TestContext::new();
    let mut navbar = ctx.shop.subscribe();
    let mut cart_view = ctx.shop.subscribe();

    ctx.shop.login("shopper@example.com").unwrap();
    ctx.shop.add_product(&product(1, "10.00")).unwrap();

    // Re-read on every event, the way a view would.
    while let Some(event) = cart_view.try_recv() {
        if event == ChangeEvent::CartChanged {
            assert_eq!(ctx.shop.cart().total_items(), 1);
        }
    }
    assert_eq!(
        navbar.drain(),
        vec![ChangeEvent::SessionChanged, ChangeEvent::CartChanged]
    );

    ctx.shop.logout().unwrap();
    assert_eq!(
        navbar.drain(),
        vec![ChangeEvent::SessionChanged, ChangeEvent::CartChanged]
    );
}

#[test]
fn test_dropped_subscription_unregisters() {
    let ctx = TestContext::new();
    let sub = ctx.shop.subscribe();
    assert_eq!(ctx.shop.notifier().subscriber_count(), 1);
    drop(sub);
    assert_eq!(ctx.shop.notifier().subscriber_count(), 0);
}
