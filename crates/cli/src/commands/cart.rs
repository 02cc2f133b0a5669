//! Cart commands.

use pocket_bazaar_core::{PriceBreakdown, ProductId};
use pocket_bazaar_storefront::{Result, Storefront};

use super::print_cart;

/// Print the cart with totals.
#[allow(clippy::print_stdout)]
pub fn show(shop: &Storefront) {
    let cart = shop.cart().snapshot();
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }
    let pricing = PriceBreakdown::for_items(cart.items());
    print_cart(&cart, &pricing);
}

/// Add one unit of product `id`.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the product cannot be loaded,
/// or the cart cannot be saved.
#[allow(clippy::print_stdout)]
pub async fn add(shop: &Storefront, id: ProductId) -> Result<()> {
    let quantity = shop.add_to_cart(id).await?;
    println!("Added to cart (quantity {quantity})");
    Ok(())
}

/// Set the quantity of product `id`.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
#[allow(clippy::print_stdout)]
pub fn set(shop: &Storefront, id: ProductId, quantity: i64) -> Result<()> {
    if shop.cart().update_quantity(id, quantity)? {
        println!("Updated product #{id}");
    } else {
        println!("Product #{id} is not in your cart");
    }
    Ok(())
}

/// Remove product `id`.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
#[allow(clippy::print_stdout)]
pub fn remove(shop: &Storefront, id: ProductId) -> Result<()> {
    if shop.cart().remove_item(id)? {
        println!("Removed product #{id}");
    } else {
        println!("Product #{id} is not in your cart");
    }
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
#[allow(clippy::print_stdout)]
pub fn clear(shop: &Storefront) -> Result<()> {
    shop.cart().clear()?;
    println!("Cart cleared");
    Ok(())
}
