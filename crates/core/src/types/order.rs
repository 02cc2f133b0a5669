//! Recorded orders and the order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::LineItem;
use super::id::OrderId;
use super::price::Price;
use super::status::OrderStatus;

/// An immutable record of a completed checkout.
///
/// `items` is a copy of the cart at placement time; later cart edits never
/// reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Timestamp-derived identifier.
    pub id: OrderId,
    /// Cart lines at the moment the order was placed.
    pub items: Vec<LineItem>,
    /// Grand total (subtotal + shipping + tax), unrounded.
    pub total: Price,
    /// When the order was placed.
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: OrderStatus,
}

impl Order {
    /// Record a completed order.
    #[must_use]
    pub const fn completed(
        id: OrderId,
        items: Vec<LineItem>,
        total: Price,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            items,
            total,
            created_at,
            status: OrderStatus::Completed,
        }
    }

    /// Sum of the quantities of every line.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Orders, newest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderHistory {
    orders: Vec<Order>,
}

impl OrderHistory {
    /// An empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self { orders: Vec::new() }
    }

    /// Put `order` in front of every existing order.
    pub fn prepend(&mut self, order: Order) {
        self.orders.insert(0, order);
    }

    /// The most recently placed order.
    #[must_use]
    pub fn latest(&self) -> Option<&Order> {
        self.orders.first()
    }

    /// Find an order by id.
    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == id)
    }

    /// Orders, newest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Number of orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no order has been placed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl IntoIterator for OrderHistory {
    type Item = Order;
    type IntoIter = std::vec::IntoIter<Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.into_iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::cart::tests::product;

    fn order_at(millis: i64) -> Order {
        let at = Utc.timestamp_millis_opt(millis).unwrap();
        Order::completed(
            OrderId::from_timestamp(at),
            vec![LineItem::new(product(1, "5.00"))],
            Price::from_cents(500),
            at,
        )
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let mut history = OrderHistory::new();
        history.prepend(order_at(1_000));
        history.prepend(order_at(2_000));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().id.as_str(), "ORD-2000");
        assert_eq!(history.orders()[1].id.as_str(), "ORD-1000");
    }

    #[test]
    fn test_get_by_id() {
        let mut history = OrderHistory::new();
        let order = order_at(1_000);
        history.prepend(order.clone());
        assert_eq!(history.get(&order.id), Some(&order));
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(order_at(1_000)).unwrap();
        assert_eq!(value["id"], "ORD-1000");
        assert_eq!(value["status"], "completed");
        assert!(value["date"].is_string());
        assert_eq!(value["items"][0]["quantity"], 1);
    }

    #[test]
    fn test_history_roundtrip() {
        let mut history = OrderHistory::new();
        history.prepend(order_at(1_000));
        history.prepend(order_at(3_000));
        let json = serde_json::to_string(&history).unwrap();
        let restored: OrderHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, history);
    }
}
