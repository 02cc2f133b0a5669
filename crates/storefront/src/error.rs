//! Unified error handling for engine operations.
//!
//! Every variant is a local, recoverable condition. Callers turn them into
//! user-facing notices with [`StorefrontError::user_message`].

use thiserror::Error;

use pocket_bazaar_core::EmailError;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Engine-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The operation needs a signed-in shopper.
    #[error("Unauthenticated: no active session")]
    Unauthenticated,

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A catalog query failed or returned malformed data.
    #[error("Catalog fetch failed: {0}")]
    CatalogFetchFailed(#[from] CatalogError),

    /// A durable write failed; the previously stored state is unchanged.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Login input is not an email address.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StorefrontError {
    /// Short message suitable for showing to the shopper.
    ///
    /// Internal details (paths, HTTP statuses) are left out.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please login to continue".to_string(),
            Self::EmptyCart => "Your cart is empty. Add some items first".to_string(),
            Self::CatalogFetchFailed(CatalogError::NotFound(_)) => "Product not found".to_string(),
            Self::CatalogFetchFailed(_) => "Failed to load products".to_string(),
            Self::Store(_) => "Could not save your changes, please try again".to_string(),
            Self::InvalidEmail(e) => format!("Invalid email address: {e}"),
            Self::Config(e) => e.to_string(),
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;
