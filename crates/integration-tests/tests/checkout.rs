//! Order placement end to end.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use pocket_bazaar_core::{Cart, OrderStatus, Price, PriceBreakdown};
use pocket_bazaar_integration_tests::{TestContext, product};
use pocket_bazaar_storefront::StorefrontError;

fn price(s: &str) -> Price {
    Price::new(Decimal::from_str(s).unwrap())
}

/// 1 x 10.00 and 3 x 20.00.
fn two_line_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add(&product(1, "10.00"));
    for _ in 0..3 {
        cart.add(&product(2, "20.00"));
    }
    cart
}

#[tokio::test]
async fn test_place_order_without_session_changes_nothing() {
    let ctx = TestContext::new();
    let cart = two_line_cart();

    let err = ctx.shop.ledger().place_order(&cart).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Unauthenticated));
    assert!(ctx.shop.ledger().history().is_empty());
    assert!(ctx.shop.cart().snapshot().is_empty());
}

#[tokio::test]
async fn test_place_order_with_session() {
    let mut ctx = TestContext::new();
    ctx.shop.login("shopper@example.com").unwrap();
    ctx.shop.add_product(&product(1, "10.00")).unwrap();
    for _ in 0..3 {
        ctx.shop.add_product(&product(2, "20.00")).unwrap();
    }
    let cart = ctx.shop.cart().snapshot();
    assert_eq!(cart, two_line_cart());

    let order = ctx.shop.ledger().place_order(&cart).await.unwrap();

    let expected = PriceBreakdown::for_items(cart.items());
    assert_eq!(expected.subtotal, price("70.00"));
    assert_eq!(expected.shipping, price("9.99"));
    assert_eq!(expected.tax, price("7.00"));
    assert_eq!(order.total, price("86.99"));
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(ctx.shop.cart().snapshot().is_empty());

    ctx.restart();
    let history = ctx.shop.orders().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.latest(), Some(&order));
    assert!(ctx.shop.cart().snapshot().is_empty());
}

#[tokio::test]
async fn test_checkout_requires_items() {
    let ctx = TestContext::new();
    ctx.shop.login("shopper@example.com").unwrap();
    let err = ctx.shop.checkout().await.unwrap_err();
    assert!(matches!(err, StorefrontError::EmptyCart));
    assert_eq!(err.user_message(), "Your cart is empty. Add some items first");
}

#[tokio::test]
async fn test_history_newest_first_across_restarts() {
    let mut ctx = TestContext::new();
    ctx.shop.login("shopper@example.com").unwrap();

    ctx.shop.add_product(&product(1, "150.00")).unwrap();
    let first = ctx.shop.checkout().await.unwrap();
    assert_eq!(first.total, price("165.00"));

    ctx.restart();
    ctx.shop.add_product(&product(2, "5.00")).unwrap();
    let second = ctx.shop.checkout().await.unwrap();

    let ids: Vec<_> = ctx
        .shop
        .orders()
        .unwrap()
        .into_iter()
        .map(|order| order.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test(start_paused = true)]
async fn test_payment_delay_is_bounded() {
    let ctx = TestContext::with_payment_delay(Duration::from_secs(2));
    ctx.shop.login("shopper@example.com").unwrap();
    ctx.shop.add_product(&product(1, "10.00")).unwrap();

    let started = tokio::time::Instant::now();
    ctx.shop.checkout().await.unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(3));
}

#[tokio::test]
async fn test_orders_page_requires_session() {
    let ctx = TestContext::new();
    assert!(matches!(
        ctx.shop.orders(),
        Err(StorefrontError::Unauthenticated)
    ));
}
