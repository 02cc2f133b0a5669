//! Cart engine.
//!
//! Owns the shopper's cart. The cart is hydrated from the store on first
//! access and again whenever the session it was loaded under is no longer
//! current, so a logout or a new login is never answered from a stale copy.
//!
//! Every mutation is applied to a copy, persisted, and only then made
//! visible; a failed write leaves both the stored and the in-memory cart as
//! they were. `cart-changed` is broadcast after the write, and a mutation
//! that changes nothing neither writes nor broadcasts.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::instrument;

use pocket_bazaar_core::{Cart, Product, ProductId, Session};

use crate::error::{Result, StorefrontError};
use crate::notifier::{ChangeEvent, ChangeNotifier};
use crate::session::SessionGate;
use crate::store::{Namespace, PersistentStore};

#[derive(Debug, Default)]
struct Hydrated {
    loaded: bool,
    owner: Option<Session>,
    cart: Cart,
}

/// Cart operations for the current shopper. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct CartEngine {
    store: PersistentStore,
    gate: SessionGate,
    notifier: ChangeNotifier,
    state: Arc<Mutex<Hydrated>>,
}

impl CartEngine {
    /// Engine over the cart stored in `store`.
    #[must_use]
    pub fn new(store: PersistentStore, gate: SessionGate, notifier: ChangeNotifier) -> Self {
        Self {
            store,
            gate,
            notifier,
            state: Arc::new(Mutex::new(Hydrated::default())),
        }
    }

    /// Add one unit of `product`.
    ///
    /// Returns the product's quantity in the cart afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` (without touching the cart) when nobody is
    /// signed in, or a storage error if the cart could not be saved.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&self, product: &Product) -> Result<u32> {
        if self.gate.current().is_none() {
            return Err(StorefrontError::Unauthenticated);
        }
        let mut quantity = 0;
        self.mutate(|cart| {
            quantity = cart.add(product);
            true
        })?;
        Ok(quantity)
    }

    /// Set a line's quantity; values below 1 become 1.
    ///
    /// Returns `false` if the product is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be saved.
    #[instrument(skip(self))]
    pub fn update_quantity(&self, id: ProductId, quantity: i64) -> Result<bool> {
        let mut found = false;
        self.mutate(|cart| {
            let before = cart.get(id).map(|line| line.quantity);
            found = cart.set_quantity(id, quantity);
            found && before != cart.get(id).map(|line| line.quantity)
        })?;
        Ok(found)
    }

    /// Remove a product's line. Returns `false` if it was not in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be saved.
    #[instrument(skip(self))]
    pub fn remove_item(&self, id: ProductId) -> Result<bool> {
        self.mutate(|cart| cart.remove(id))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be saved.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<()> {
        self.mutate(|cart| {
            let had_items = !cart.is_empty();
            cart.clear();
            had_items
        })?;
        Ok(())
    }

    /// Copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Clone::clone)
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.with_cart(Cart::total_items)
    }

    fn with_cart<R>(&self, read: impl FnOnce(&Cart) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.hydrate(&mut state);
        read(&state.cart)
    }

    /// Apply `change` to a copy; persist and publish it when it reports a change.
    fn mutate(&self, change: impl FnOnce(&mut Cart) -> bool) -> Result<bool> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.hydrate(&mut state);

        let mut next = state.cart.clone();
        if !change(&mut next) {
            return Ok(false);
        }
        self.store.save(Namespace::Cart, &next)?;
        state.cart = next;
        drop(state);

        self.notifier.broadcast(ChangeEvent::CartChanged);
        Ok(true)
    }

    fn hydrate(&self, state: &mut Hydrated) {
        let current = self.gate.current();
        if state.loaded && state.owner == current {
            return;
        }
        state.cart = self.store.load(Namespace::Cart).unwrap_or_default();
        state.owner = current;
        state.loaded = true;
        tracing::debug!(lines = state.cart.len(), "Hydrated cart");
    }
}
