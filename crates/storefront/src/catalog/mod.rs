//! Product catalog client.
//!
//! Read-only access to a Fake Store compatible REST API:
//!
//! | Query                    | Path                          |
//! |--------------------------|-------------------------------|
//! | all products             | `/products`                   |
//! | one product              | `/products/{id}`              |
//! | category names           | `/products/categories`        |
//! | products in a category   | `/products/category/{name}`   |
//!
//! Responses are cached with `moka` (TTL from [`CatalogConfig`]); failures
//! are never cached. There is no automatic retry.

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use pocket_bazaar_core::{Product, ProductId};

use crate::config::CatalogConfig;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog answered with a non-success status.
    #[error("catalog returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A listing came back with no body at all.
    #[error("empty response from {0}")]
    EmptyBody(String),

    /// Base URL cannot have paths appended.
    #[error("invalid catalog base URL: {0}")]
    InvalidBaseUrl(String),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the product catalog.
///
/// Cheap to clone; clones share the connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cached", &self.inner.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot take paths or the HTTP client
    /// cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pocket-bazaar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = config.cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL of the catalog.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build the URL for `segments` under the base URL. Segments are
    /// percent-encoded, so category names with spaces or quotes are safe.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` and return the body. Every non-success status is an error,
    /// 404 included.
    async fn fetch_body(&self, url: Url) -> Result<String, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(body)
    }

    /// GET a listing. An empty or `null` body is malformed here; only a
    /// literal `[]` means "nothing".
    async fn fetch_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, CatalogError> {
        let body = self.fetch_body(url.clone()).await?;
        decode_body(&body)?.ok_or_else(|| CatalogError::EmptyBody(url.to_string()))
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let cache = self.inner.cache.as_ref()?;
        let value = cache.get(key).await;
        if value.is_some() {
            debug!(?key, "Cache hit");
        }
        value
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.cached(&CacheKey::Products).await {
            return Ok(products);
        }

        let url = self.endpoint(&["products"])?;
        let products: Vec<Product> = self.fetch_list(url).await?;
        debug!(count = products.len(), "Fetched products");

        self.remember(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the catalog has no such product,
    /// or another error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let url = self.endpoint(&["products", &id.to_string()])?;
        let not_found = || CatalogError::NotFound(format!("product {id}"));
        // Unknown ids come back as 404 or as a 200 with an empty/null body.
        let body = match self.fetch_body(url).await {
            Err(CatalogError::Status { status: 404, .. }) => return Err(not_found()),
            result => result?,
        };
        let product: Product = decode_body(&body)?.ok_or_else(not_found)?;

        self.remember(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let url = self.endpoint(&["products", "categories"])?;
        let categories: Vec<String> = self.fetch_list(url).await?;

        self.remember(
            CacheKey::Categories,
            CacheValue::Categories(categories.clone()),
        )
        .await;
        Ok(categories)
    }

    /// Products in `category`. The catalog answers an unknown category with
    /// `[]`, which comes back as an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn products_in_category(&self, category: &str) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Category(category.to_string());
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            return Ok(products);
        }

        let url = self.endpoint(&["products", "category", category])?;
        let products: Vec<Product> = self.fetch_list(url).await?;

        self.remember(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// `count` products sampled at random from the full listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched.
    #[instrument(skip(self))]
    pub async fn featured(&self, count: usize) -> Result<Vec<Product>, CatalogError> {
        let products = self.all_products().await?;
        Ok(pick_featured(&products, count, &mut rand::rng()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Decode a catalog body, mapping an empty body or `null` to `None`.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<Option<T>, CatalogError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %trimmed.chars().take(500).collect::<String>(),
            "Failed to parse catalog response"
        );
        CatalogError::Parse(e)
    })
}

/// Up to `count` distinct products in random order.
fn pick_featured<R: Rng + ?Sized>(products: &[Product], count: usize, rng: &mut R) -> Vec<Product> {
    products.choose_multiple(rng, count).cloned().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    const PRODUCTS: &str = r#"[
        {"id":1,"title":"Backpack","price":109.95,"description":"d","category":"men's clothing","image":"i","rating":{"rate":3.9,"count":120}},
        {"id":2,"title":"T-Shirt","price":22.3,"description":"d","category":"men's clothing","image":"i","rating":{"rate":4.1,"count":259}},
        {"id":5,"title":"Bracelet","price":695,"description":"d","category":"jewelery","image":"i","rating":{"rate":4.6,"count":400}},
        {"id":9,"title":"Hard Drive","price":64,"description":"d","category":"electronics","image":"i","rating":{"rate":3.3,"count":203}}
    ]"#;

    /// Answer every request on a local port with the same response.
    async fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(&CatalogConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
            cache_ttl: Some(Duration::from_secs(60)),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let client = client("https://fakestoreapi.com");
        assert_eq!(
            client.endpoint(&["products"]).unwrap().as_str(),
            "https://fakestoreapi.com/products"
        );
        assert_eq!(
            client.endpoint(&["products", "7"]).unwrap().as_str(),
            "https://fakestoreapi.com/products/7"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("http://localhost:3000/api/");
        assert_eq!(
            client.endpoint(&["products", "categories"]).unwrap().as_str(),
            "http://localhost:3000/api/products/categories"
        );
    }

    #[test]
    fn test_category_is_percent_encoded() {
        let client = client("https://fakestoreapi.com");
        let url = client
            .endpoint(&["products", "category", "men's clothing"])
            .unwrap();
        assert_eq!(url.path(), "/products/category/men's%20clothing");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = CatalogClient::new(&CatalogConfig::new(
            Url::parse("mailto:shop@example.com").unwrap(),
        ));
        assert!(matches!(result, Err(CatalogError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_decode_products() {
        let products: Vec<Product> = decode_body(PRODUCTS).unwrap().unwrap();
        assert_eq!(products.len(), 4);
        assert_eq!(products[2].price.display(), "$695.00");
    }

    #[test]
    fn test_decode_empty_and_null() {
        assert!(decode_body::<Product>("").unwrap().is_none());
        assert!(decode_body::<Product>("  null \n").unwrap().is_none());
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            decode_body::<Vec<Product>>("{\"oops\":"),
            Err(CatalogError::Parse(_))
        ));
        assert!(matches!(
            decode_body::<Vec<Product>>("[{\"id\":\"one\"}]"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_pick_featured() {
        let products: Vec<Product> = decode_body(PRODUCTS).unwrap().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let picked = pick_featured(&products, 3, &mut rng);
        assert_eq!(picked.len(), 3);
        let ids: HashSet<_> = picked.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(picked.iter().all(|p| products.contains(p)));

        assert_eq!(pick_featured(&products, 10, &mut rng).len(), 4);
        assert!(pick_featured(&[], 4, &mut rng).is_empty());
    }

    #[tokio::test]
    async fn test_cache_roundtrip() {
        let client = client("https://fakestoreapi.com");
        let products: Vec<Product> = decode_body(PRODUCTS).unwrap().unwrap();

        client
            .remember(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        // Served from cache, no network.
        assert_eq!(client.all_products().await.unwrap(), products);

        client.invalidate_all();
        client.inner.cache.as_ref().unwrap().run_pending_tasks().await;
        assert!(client.cached(&CacheKey::Products).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let client = CatalogClient::new(&CatalogConfig {
            cache_ttl: None,
            ..CatalogConfig::new(Url::parse("https://fakestoreapi.com").unwrap())
        })
        .unwrap();
        client
            .remember(CacheKey::Categories, CacheValue::Categories(vec!["x".to_string()]))
            .await;
        assert!(client.cached(&CacheKey::Categories).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_catalog_fails() {
        let client = client("http://127.0.0.1:9");
        let err = client.categories().await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
        assert!(client.cached(&CacheKey::Categories).await.is_none());
    }

    #[tokio::test]
    async fn test_listing_404_is_an_error_and_not_cached() {
        let client = client(&serve("404 Not Found", "").await);

        let err = client.all_products().await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 404, .. }));
        assert!(client.cached(&CacheKey::Products).await.is_none());

        let err = client.categories().await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 404, .. }));
        assert!(client.cached(&CacheKey::Categories).await.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_not_cached() {
        let client = client(&serve("500 Internal Server Error", "oops").await);

        let err = client.products_in_category("electronics").await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 500, .. }));
        let key = CacheKey::Category("electronics".to_string());
        assert!(client.cached(&key).await.is_none());

        let err = client.product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let missing = client(&serve("404 Not Found", "").await);
        let err = missing.product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        let blank = client(&serve("200 OK", "").await);
        let err = blank.product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_listing_body() {
        let empty = client(&serve("200 OK", "[]").await);
        assert!(empty.products_in_category("hats").await.unwrap().is_empty());

        let null = client(&serve("200 OK", "null").await);
        let err = null.all_products().await.unwrap_err();
        assert!(matches!(err, CatalogError::EmptyBody(_)));
        assert!(null.cached(&CacheKey::Products).await.is_none());
    }
}
