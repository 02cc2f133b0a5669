//! Pocket Bazaar storefront engine.
//!
//! The stateful half of the shop: session gate, cart engine, order ledger,
//! change notifier, persistent store and the product catalog client. The
//! [`Storefront`] type wires them together; views read from it and mutate
//! only through its operations.
//!
//! # Example
//!
//! ```rust,ignore
//! use pocket_bazaar_storefront::{Storefront, StorefrontConfig};
//!
//! let shop = Storefront::new(StorefrontConfig::from_env()?)?;
//! shop.login("shopper@example.com")?;
//! shop.add_to_cart(ProductId::new(1)).await?;
//! let order = shop.checkout().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notifier;
pub mod orders;
pub mod session;
pub mod state;
pub mod store;

pub use cart::CartEngine;
pub use catalog::{CatalogClient, CatalogError};
pub use config::{StorefrontConfig, StorageConfig};
pub use error::{Result, StorefrontError};
pub use notifier::{ChangeEvent, ChangeNotifier, Subscription};
pub use orders::{CheckoutSummary, OrderLedger, SimulatedPayment};
pub use session::SessionGate;
pub use state::Storefront;
pub use store::{FileStore, KeyValueStore, Loaded, MemoryStore, Namespace, PersistentStore};
