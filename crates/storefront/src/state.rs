//! Engine state shared across views.

use std::sync::Arc;

use tracing::instrument;

use pocket_bazaar_core::{Email, Order, OrderHistory, Product, ProductId, Session};

use crate::cart::CartEngine;
use crate::catalog::CatalogClient;
use crate::config::{StorageConfig, StorefrontConfig};
use crate::error::{Result, StorefrontError};
use crate::notifier::{ChangeNotifier, Subscription};
use crate::orders::{CheckoutSummary, OrderLedger, SimulatedPayment};
use crate::session::SessionGate;
use crate::store::{FileStore, KeyValueStore, MemoryStore, PersistentStore};

/// The commerce engine: every component, wired once per process.
///
/// This struct is cheaply cloneable via `Arc`; clones share the same cart
/// cache, notifier and catalog cache.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    store: PersistentStore,
    notifier: ChangeNotifier,
    session: SessionGate,
    cart: CartEngine,
    ledger: OrderLedger,
    catalog: CatalogClient,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("store", &self.inner.store)
            .field("catalog", &self.inner.catalog)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create the engine with the storage backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the
    /// catalog client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let backend: Arc<dyn KeyValueStore> = match &config.storage {
            StorageConfig::File(root) => Arc::new(FileStore::open(root.clone())?),
            StorageConfig::Memory => Arc::new(MemoryStore::new()),
        };
        Self::with_backend(config, backend)
    }

    /// Create the engine over an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn with_backend(config: StorefrontConfig, backend: Arc<dyn KeyValueStore>) -> Result<Self> {
        let store = PersistentStore::new(backend, &config.store_key);
        let notifier = ChangeNotifier::new();
        let session = SessionGate::new(store.clone(), notifier.clone());
        let cart = CartEngine::new(store.clone(), session.clone(), notifier.clone());
        let ledger = OrderLedger::new(
            store.clone(),
            session.clone(),
            cart.clone(),
            SimulatedPayment::new(config.payment_delay),
        );
        let catalog = CatalogClient::new(&config.catalog)?;

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                store,
                notifier,
                session,
                cart,
                ledger,
                catalog,
            }),
        })
    }

    /// Get a reference to the engine configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the persistent store.
    #[must_use]
    pub fn store(&self) -> &PersistentStore {
        &self.inner.store
    }

    /// Get a reference to the change notifier.
    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.inner.notifier
    }

    /// Get a reference to the session gate.
    #[must_use]
    pub fn session(&self) -> &SessionGate {
        &self.inner.session
    }

    /// Get a reference to the cart engine.
    #[must_use]
    pub fn cart(&self) -> &CartEngine {
        &self.inner.cart
    }

    /// Get a reference to the order ledger.
    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.inner.ledger
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Listen for session and cart changes.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.inner.notifier.subscribe()
    }

    /// Sign in as `email`. No credential is checked.
    ///
    /// # Errors
    ///
    /// Returns an error if `email` is not an email address or the session
    /// could not be saved.
    pub fn login(&self, email: &str) -> Result<Session> {
        let email = Email::parse(email)?;
        Ok(self.inner.session.login(email)?)
    }

    /// Sign out and discard the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session or cart could not be deleted.
    pub fn logout(&self) -> Result<()> {
        Ok(self.inner.session.logout()?)
    }

    /// Look up `id` in the catalog and add one unit of it to the cart.
    ///
    /// The session is checked before the catalog is queried.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when signed out, `CatalogFetchFailed` if the
    /// product cannot be loaded, or a storage error.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, id: ProductId) -> Result<u32> {
        self.inner.session.require()?;
        let product = self.inner.catalog.product(id).await?;
        self.add_product(&product)
    }

    /// Add one unit of an already loaded product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when signed out, or a storage error.
    pub fn add_product(&self, product: &Product) -> Result<u32> {
        self.inner.cart.add_item(product)
    }

    /// Check that checkout can start and price the cart.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when signed out, or `EmptyCart`.
    pub fn begin_checkout(&self) -> Result<CheckoutSummary> {
        self.inner.session.require()?;
        let cart = self.inner.cart.snapshot();
        if cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        Ok(CheckoutSummary::for_cart(cart))
    }

    /// Pay for the current cart and record the order.
    ///
    /// # Errors
    ///
    /// See [`begin_checkout`](Self::begin_checkout) and
    /// [`OrderLedger::place_order`].
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Order> {
        let summary = self.begin_checkout()?;
        self.inner.ledger.place_order(&summary.cart).await
    }

    /// Order history for the signed-in shopper.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when signed out.
    pub fn orders(&self) -> Result<OrderHistory> {
        self.inner.session.require()?;
        Ok(self.inner.ledger.history())
    }
}
