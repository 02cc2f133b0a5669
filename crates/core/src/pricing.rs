//! Order pricing.
//!
//! Store policy, fixed for every order:
//! - shipping is free when the subtotal is strictly above $100.00, otherwise $9.99
//! - tax is a flat 10% of the subtotal
//!
//! All amounts stay unrounded; only the `*_display` helpers round to cents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{LineItem, Price};

/// Subtotal above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Price = Price::new(Decimal::ONE_HUNDRED);

/// Flat shipping charge below the threshold, in cents.
pub const FLAT_SHIPPING_CENTS: i64 = 999;

/// Tax rate as a percentage of the subtotal.
pub const TAX_RATE_PERCENT: i64 = 10;

/// Price components for a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Sum of price × quantity.
    pub subtotal: Price,
    /// Shipping charge.
    pub shipping: Price,
    /// Tax on the subtotal.
    pub tax: Price,
    /// subtotal + shipping + tax.
    pub total: Price,
}

impl PriceBreakdown {
    /// Price `items`.
    ///
    /// Pure: the same items always produce exactly the same breakdown.
    #[must_use]
    pub fn for_items(items: &[LineItem]) -> Self {
        let subtotal: Price = items.iter().map(LineItem::line_total).sum();
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Price::ZERO
        } else {
            Price::from_cents(FLAT_SHIPPING_CENTS)
        };
        let tax = subtotal * Decimal::new(TAX_RATE_PERCENT, 2);
        let total = subtotal + shipping + tax;

        Self {
            subtotal,
            shipping,
            tax,
            total,
        }
    }

    /// Whether this order ships free.
    #[must_use]
    pub fn qualifies_for_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }

    /// How much more the shopper must add to cross the free-shipping threshold.
    ///
    /// `None` once shipping is already free. Because the threshold is strict,
    /// a subtotal of exactly $100.00 still needs one more cent.
    #[must_use]
    pub fn amount_until_free_shipping(&self) -> Option<Price> {
        if self.qualifies_for_free_shipping() {
            return None;
        }
        let remaining = FREE_SHIPPING_THRESHOLD.amount() - self.subtotal.amount() + Decimal::new(1, 2);
        Some(Price::new(remaining.max(Decimal::new(1, 2))))
    }

    /// Shipping as shown to the shopper: `FREE` or a dollar amount.
    #[must_use]
    pub fn shipping_display(&self) -> String {
        if self.shipping.is_zero() {
            "FREE".to_string()
        } else {
            self.shipping.display()
        }
    }
}
