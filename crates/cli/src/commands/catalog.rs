//! Browsing commands.

use pocket_bazaar_core::ProductId;
use pocket_bazaar_storefront::{Result, Storefront};

use super::product_line;

/// List products, optionally filtered by category or sampled at random.
///
/// # Errors
///
/// Returns an error if the catalog cannot be queried.
#[allow(clippy::print_stdout)]
pub async fn products(shop: &Storefront, category: Option<&str>, featured: Option<usize>) -> Result<()> {
    let products = match (category, featured) {
        (Some(category), _) => shop.catalog().products_in_category(category).await?,
        (None, Some(count)) => shop.catalog().featured(count).await?,
        (None, None) => shop.catalog().all_products().await?,
    };

    if products.is_empty() {
        println!("No products found");
    }
    for product in &products {
        println!("{}", product_line(product));
    }
    Ok(())
}

/// Show one product in full.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn product(shop: &Storefront, id: ProductId) -> Result<()> {
    let product = shop.catalog().product(id).await?;
    println!("{}", product.title);
    println!("{}", product.price.display());
    println!("Category: {}", product.category);
    println!(
        "Rating: {:.1} ({} reviews)",
        product.rating.rate, product.rating.count
    );
    println!();
    println!("{}", product.description);
    Ok(())
}

/// List category names.
///
/// # Errors
///
/// Returns an error if the catalog cannot be queried.
#[allow(clippy::print_stdout)]
pub async fn categories(shop: &Storefront) -> Result<()> {
    for category in shop.catalog().categories().await? {
        println!("{category}");
    }
    Ok(())
}
