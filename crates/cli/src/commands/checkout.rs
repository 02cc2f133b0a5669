//! Checkout and order history commands.

use pocket_bazaar_storefront::{Result, Storefront};

use super::print_cart;

/// Show the order summary, pay, and place the order.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the cart is empty, or the order
/// cannot be recorded.
#[allow(clippy::print_stdout)]
pub async fn checkout(shop: &Storefront) -> Result<()> {
    let summary = shop.begin_checkout()?;
    print_cart(&summary.cart, &summary.pricing);
    println!();
    println!("Processing payment...");

    let order = shop.ledger().place_order(&summary.cart).await?;
    println!("Order placed successfully!");
    println!("Order {} - {}", order.id, order.total.display());
    Ok(())
}

/// List past orders, newest first.
///
/// # Errors
///
/// Returns an error if nobody is signed in.
#[allow(clippy::print_stdout)]
pub fn orders(shop: &Storefront) -> Result<()> {
    let history = shop.orders()?;
    if history.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    for order in history.orders() {
        println!(
            "{}  {}  {}  {} items  {}",
            order.id,
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.status,
            order.item_count(),
            order.total.display()
        );
        for line in &order.items {
            println!("    {} x {}", line.quantity, line.product.title);
        }
    }
    Ok(())
}
