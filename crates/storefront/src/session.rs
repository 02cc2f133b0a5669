//! Session gate.
//!
//! The session is a local marker that a shopper is signed in. Nothing is
//! verified against a server; it only gates cart mutation and checkout.
//! Callers re-read [`SessionGate::current`] instead of holding on to a
//! session across a logout.

use chrono::Utc;
use tracing::instrument;

use pocket_bazaar_core::{Email, Session};

use crate::error::{Result, StorefrontError};
use crate::notifier::{ChangeEvent, ChangeNotifier};
use crate::store::{Namespace, PersistentStore, StoreError};

/// Reads and replaces the persisted session.
#[derive(Debug, Clone)]
pub struct SessionGate {
    store: PersistentStore,
    notifier: ChangeNotifier,
}

impl SessionGate {
    /// Gate over the session stored in `store`.
    #[must_use]
    pub const fn new(store: PersistentStore, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    /// The signed-in shopper, if any. An unreadable session counts as signed out.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.store.load(Namespace::Session).into_option()
    }

    /// The current session, or `Unauthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Unauthenticated` when nobody is signed in.
    pub fn require(&self) -> Result<Session> {
        self.current().ok_or(StorefrontError::Unauthenticated)
    }

    /// Start and persist a session for `email`.
    ///
    /// Always succeeds apart from storage failures; a previous session is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be written.
    #[instrument(skip(self), fields(email = %email))]
    pub fn login(&self, email: Email) -> std::result::Result<Session, StoreError> {
        let session = Session::start(email, Utc::now());
        self.store.save(Namespace::Session, &session)?;
        tracing::info!("Shopper logged in");
        self.notifier.broadcast(ChangeEvent::SessionChanged);
        Ok(session)
    }

    /// End the session and discard the cart with it.
    ///
    /// # Errors
    ///
    /// Returns an error if either entry could not be deleted. The session is
    /// only removed after the cart is gone, so a failure never leaves a cart
    /// behind without its owner.
    #[instrument(skip(self))]
    pub fn logout(&self) -> std::result::Result<(), StoreError> {
        self.store.remove(Namespace::Cart)?;
        self.store.remove(Namespace::Session)?;
        tracing::info!("Shopper logged out");
        self.notifier.broadcast(ChangeEvent::SessionChanged);
        self.notifier.broadcast(ChangeEvent::CartChanged);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};

    fn gate() -> (Arc<MemoryStore>, SessionGate, ChangeNotifier) {
        let backend = Arc::new(MemoryStore::new());
        let notifier = ChangeNotifier::new();
        let store = PersistentStore::new(backend.clone(), "ecommerce");
        (backend, SessionGate::new(store, notifier.clone()), notifier)
    }

    fn email() -> Email {
        Email::parse("shopper@example.com").unwrap()
    }

    #[test]
    fn test_signed_out_by_default() {
        let (_, gate, _) = gate();
        assert_eq!(gate.current(), None);
        assert!(matches!(gate.require(), Err(StorefrontError::Unauthenticated)));
    }

    #[test]
    fn test_login_persists_and_notifies() {
        let (_, gate, notifier) = gate();
        let mut sub = notifier.subscribe();

        let session = gate.login(email()).unwrap();
        assert_eq!(gate.current(), Some(session.clone()));
        assert_eq!(gate.require().unwrap(), session);
        assert_eq!(sub.drain(), vec![ChangeEvent::SessionChanged]);
    }

    #[test]
    fn test_login_replaces_previous_session() {
        let (_, gate, _) = gate();
        let first = gate.login(email()).unwrap();
        let second = gate.login(Email::parse("other@example.com").unwrap()).unwrap();
        assert_ne!(first, second);
        assert_eq!(gate.current(), Some(second));
    }

    #[test]
    fn test_logout_clears_session_and_cart() {
        let (backend, gate, notifier) = gate();
        gate.login(email()).unwrap();
        backend.set(Namespace::Cart, "ecommerce", "[]").unwrap();
        let mut sub = notifier.subscribe();

        gate.logout().unwrap();
        assert_eq!(gate.current(), None);
        assert_eq!(backend.get(Namespace::Cart, "ecommerce").unwrap(), None);
        assert_eq!(
            sub.drain(),
            vec![ChangeEvent::SessionChanged, ChangeEvent::CartChanged]
        );
    }

    #[test]
    fn test_corrupt_session_counts_as_signed_out() {
        let (backend, gate, _) = gate();
        backend
            .set(Namespace::Session, "ecommerce", "{\"email\":")
            .unwrap();
        assert_eq!(gate.current(), None);
    }
}
