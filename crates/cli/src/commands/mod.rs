//! Command implementations and shared output helpers.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;

use pocket_bazaar_core::{Cart, PriceBreakdown, Product};

/// One-line product summary.
fn product_line(product: &Product) -> String {
    format!(
        "#{:<4} {:>10}  {}  [{}]",
        product.id,
        product.price.display(),
        product.title,
        product.category
    )
}

/// Cart lines followed by the order summary block.
#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart, pricing: &PriceBreakdown) {
    for line in cart.items() {
        println!(
            "#{:<4} {:>3} x {:>10} = {:>10}  {}",
            line.id(),
            line.quantity,
            line.price().display(),
            line.line_total().display(),
            line.product.title
        );
    }
    println!();
    println!("Subtotal ({} items): {}", cart.total_items(), pricing.subtotal.display());
    println!("Shipping: {}", pricing.shipping_display());
    println!("Tax: {}", pricing.tax.display());
    println!("Total: {}", pricing.total.display());
    if let Some(remaining) = pricing.amount_until_free_shipping() {
        println!("Add {} more for free shipping", remaining.display());
    }
}
