//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `BAZAAR_DATA_DIR` - Directory for persisted state (default: `.bazaar`)
//! - `BAZAAR_STORE_KEY` - Key used inside every storage namespace (default: `ecommerce`)
//! - `CATALOG_BASE_URL` - Product catalog API (default: `https://fakestoreapi.com`)
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog response cache TTL, 0 disables (default: 300)
//! - `CHECKOUT_PAYMENT_DELAY_MS` - Simulated payment processing time (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::store::is_safe_store_key;

/// Default catalog service.
pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";

/// Upper bound on the simulated payment delay, so checkout always resolves promptly.
pub const MAX_PAYMENT_DELAY: Duration = Duration::from_secs(60);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where engine state is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// JSON files under a directory.
    File(PathBuf),
    /// Process memory only.
    Memory,
}

/// Storefront engine configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storage backend
    pub storage: StorageConfig,
    /// Key used inside every storage namespace
    pub store_key: String,
    /// Product catalog configuration
    pub catalog: CatalogConfig,
    /// Simulated payment processing time
    pub payment_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Product catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Response cache TTL (`None` disables the cache)
    pub cache_ttl: Option<Duration>,
}

impl CatalogConfig {
    /// Catalog at `base_url` with the default timeout and cache TTL.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
            cache_ttl: Some(Duration::from_secs(300)),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let data_dir = env.or_default("BAZAAR_DATA_DIR", ".bazaar");
        let store_key = env.or_default("BAZAAR_STORE_KEY", "ecommerce");
        if !is_safe_store_key(&store_key) {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_STORE_KEY".to_string(),
                "use 1-64 letters, digits, '-' or '_'".to_string(),
            ));
        }

        let base_url = parse_catalog_url(&env.or_default("CATALOG_BASE_URL", DEFAULT_CATALOG_URL))?;
        let timeout_secs: u64 = env.parsed("CATALOG_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let cache_ttl_secs: u64 = env.parsed("CATALOG_CACHE_TTL_SECS", 300)?;

        let payment_delay = Duration::from_millis(env.parsed("CHECKOUT_PAYMENT_DELAY_MS", 2000)?);
        if payment_delay > MAX_PAYMENT_DELAY {
            return Err(ConfigError::InvalidEnvVar(
                "CHECKOUT_PAYMENT_DELAY_MS".to_string(),
                format!("must be at most {} ms", MAX_PAYMENT_DELAY.as_millis()),
            ));
        }

        Ok(Self {
            storage: StorageConfig::File(PathBuf::from(data_dir)),
            store_key,
            catalog: CatalogConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
            },
            payment_delay,
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }

    /// In-memory configuration with no payment delay, for tests and demos.
    /// Everything else takes its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the default catalog URL fails validation.
    pub fn ephemeral() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|_| None)?;
        config.storage = StorageConfig::Memory;
        config.payment_delay = Duration::ZERO;
        Ok(config)
    }
}

/// Catalog URLs must be absolute http(s) URLs that can take path segments.
fn parse_catalog_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("CATALOG_BASE_URL".to_string(), reason);
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    Ok(url)
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}
