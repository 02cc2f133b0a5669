//! Integration tests for Pocket Bazaar.
//!
//! Scenarios run against a [`FileStore`] in a temporary directory. A
//! "restart" builds a fresh [`Storefront`] over the same directory, which is
//! what a new process would see.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocket-bazaar-integration-tests
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use tempfile::TempDir;

use pocket_bazaar_core::{Price, Product, ProductId, Rating};
use pocket_bazaar_storefront::{StorageConfig, Storefront, StorefrontConfig};

/// A data directory plus the engine currently running over it.
pub struct TestContext {
    dir: TempDir,
    /// The running engine.
    pub shop: Storefront,
}

impl TestContext {
    /// Fresh data directory, no payment delay.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or engine cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self::with_payment_delay(Duration::ZERO)
    }

    /// Fresh data directory with the given payment delay.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or engine cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_payment_delay(delay: Duration) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let shop = open(dir.path(), delay);
        Self { dir, shop }
    }

    /// Data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Replace the engine with a new one over the same data, as a new
    /// process would.
    pub fn restart(&mut self) {
        let delay = self.shop.config().payment_delay;
        self.shop = open(self.dir.path(), delay);
    }

    /// A second, independent engine over the same data.
    #[must_use]
    pub fn second_process(&self) -> Storefront {
        open(self.dir.path(), self.shop.config().payment_delay)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::expect_used)]
fn open(dir: &Path, payment_delay: Duration) -> Storefront {
    let config = StorefrontConfig {
        storage: StorageConfig::File(dir.to_path_buf()),
        payment_delay,
        ..StorefrontConfig::ephemeral().expect("Failed to build test config")
    };
    Storefront::new(config).expect("Failed to open storefront")
}

/// Product fixture priced from a decimal string such as `"10.00"`.
///
/// # Panics
///
/// Panics if `price` is not a decimal number.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product(id: i64, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Price::new(Decimal::from_str(price).expect("fixture price")),
        image: format!("https://catalog.example/img/{id}.jpg"),
        category: "electronics".to_string(),
        description: "Fixture product".to_string(),
        rating: Rating {
            rate: 4.0,
            count: 10,
        },
    }
}
