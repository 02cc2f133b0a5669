//! Order ledger and the simulated payment step.
//!
//! Placing an order prepends it to the stored history and then clears the
//! cart. If the cart cannot be cleared the history is put back exactly as it
//! was, so callers see either both effects or neither. The one exception is
//! a failed restore after a failed clear: the order then stays recorded with
//! the cart still full, and both errors are logged.

use std::time::Duration;

use chrono::Utc;
use tracing::instrument;

use pocket_bazaar_core::{Cart, Order, OrderHistory, OrderId, Price, PriceBreakdown};

use crate::cart::CartEngine;
use crate::error::{Result, StorefrontError};
use crate::session::SessionGate;
use crate::store::{Namespace, PersistentStore};

/// Stand-in for an external payment processor: always approves after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedPayment {
    delay: Duration,
}

impl SimulatedPayment {
    /// Payment that takes `delay` to approve.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Processing time.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the processing time.
    #[instrument(skip_all, fields(total = %total))]
    pub async fn charge(&self, total: Price) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::debug!("Payment approved");
    }
}

/// A priced cart, as shown before payment starts.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
    /// Copy of the cart being bought.
    pub cart: Cart,
    /// Totals for that cart.
    pub pricing: PriceBreakdown,
}

impl CheckoutSummary {
    /// Price `cart`.
    #[must_use]
    pub fn for_cart(cart: Cart) -> Self {
        let pricing = PriceBreakdown::for_items(cart.items());
        Self { cart, pricing }
    }
}

/// Turns carts into orders and keeps the history.
#[derive(Debug, Clone)]
pub struct OrderLedger {
    store: PersistentStore,
    gate: SessionGate,
    cart: CartEngine,
    payment: SimulatedPayment,
}

impl OrderLedger {
    /// Ledger recording into `store`, clearing `cart` after each order.
    #[must_use]
    pub const fn new(
        store: PersistentStore,
        gate: SessionGate,
        cart: CartEngine,
        payment: SimulatedPayment,
    ) -> Self {
        Self {
            store,
            gate,
            cart,
            payment,
        }
    }

    /// Place an order for `cart`.
    ///
    /// The session and cart are checked before payment starts. After payment
    /// the same session must still be active: a logout, or a logout followed
    /// by another login, while payment was pending aborts the order. The
    /// order holds its own copy of the lines.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if nobody is signed in.
    /// - `EmptyCart` if `cart` has no lines.
    /// - A storage error if the history or cart could not be written; stored
    ///   state is then unchanged.
    #[instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn place_order(&self, cart: &Cart) -> Result<Order> {
        let buyer = self.gate.require()?;
        if cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }

        let pricing = PriceBreakdown::for_items(cart.items());
        self.payment.charge(pricing.total).await;
        if self.gate.require()?.token != buyer.token {
            tracing::warn!("Session changed during payment, aborting order");
            return Err(StorefrontError::Unauthenticated);
        }

        let mut history = self.history();
        let now = Utc::now();
        let id = OrderId::next_after(now, history.latest().map(|order| &order.id));
        let order = Order::completed(id, cart.items().to_vec(), pricing.total, now);

        let previous = self.store.read_raw(Namespace::OrderHistory)?;
        history.prepend(order.clone());
        self.store.save(Namespace::OrderHistory, &history)?;

        if let Err(e) = self.cart.clear() {
            tracing::error!(order_id = %order.id, error = %e, "Failed to clear cart, rolling back order");
            if let Err(restore) = self
                .store
                .restore_raw(Namespace::OrderHistory, previous.as_deref())
            {
                tracing::error!(
                    order_id = %order.id,
                    clear_error = %e,
                    restore_error = %restore,
                    "Rollback failed, order stays recorded with the cart uncleared"
                );
            }
            return Err(e);
        }

        tracing::info!(order_id = %order.id, total = %order.total.display(), "Order placed");
        Ok(order)
    }

    /// Every placed order, newest first.
    #[must_use]
    pub fn history(&self) -> OrderHistory {
        self.store.load(Namespace::OrderHistory).unwrap_or_default()
    }
}
