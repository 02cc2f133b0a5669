//! Catalog product records.
//!
//! Products are owned by the external catalog. The engine copies them by
//! value into line items and never mutates them.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Shopper rating summary for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rating {
    /// Average rating between 0 and 5.
    pub rate: f64,
    /// Number of ratings.
    pub count: u32,
}

/// A product as published by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog-assigned identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
    /// Category name, as accepted by the catalog's category listing.
    pub category: String,
    /// Long description.
    pub description: String,
    /// Rating summary. Older catalog payloads omit it.
    #[serde(default)]
    pub rating: Rating,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_catalog_payload() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
            "price": 109.95,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price.display(), "$109.95");
        assert_eq!(product.category, "men's clothing");
        assert_eq!(product.rating.count, 120);
    }

    #[test]
    fn test_missing_rating_defaults() {
        let json = r#"{"id":2,"title":"t","price":1,"description":"d","category":"c","image":"i"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.rating, Rating::default());
    }
}
