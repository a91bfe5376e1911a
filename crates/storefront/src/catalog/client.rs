//! HTTP client for the marketplace catalog API.
//!
//! Uses `reqwest` for HTTP and `moka` for response caching (5-minute
//! TTL). Only unfiltered product lists and single-product lookups are
//! cached; filtered queries are cheap server-side and vary too much to
//! be worth cache slots.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use naqsh_core::{Price, ProductId};

use crate::catalog::{CatalogFilter, Product};
use crate::config::StorefrontConfig;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// No product with the requested id.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Server-side filter parameters for the product list endpoint.
///
/// The server applies these coarsely; callers still run
/// [`CatalogFilter::apply`] on the result because several views refine
/// the same fetched list without going back to the network.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CatalogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Price>,
}

impl CatalogQuery {
    /// Query with no parameters, returning the whole catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no parameter is set. Only such queries are cached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

impl From<&CatalogFilter> for CatalogQuery {
    /// Lift the server-supported parts of a local filter into query
    /// parameters. The sort key stays local; the server does not order
    /// results.
    fn from(filter: &CatalogFilter) -> Self {
        Self {
            search: (!filter.search.is_empty()).then(|| filter.search.clone()),
            category: filter
                .category
                .as_deref()
                .filter(|category| !category.is_empty())
                .map(ToOwned::to_owned),
            min_price: filter.min_price,
            max_price: filter.max_price,
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// Client for the marketplace catalog API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.clone(),
                timeout: config.http_timeout,
                cache,
            }),
        }
    }

    /// GET a JSON endpoint, with rate-limit and error-body handling.
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&CatalogQuery>,
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{path}", self.inner.base_url);
        let mut request = self.inner.client.get(&url).timeout(self.inner.timeout);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            // Missing resources are routine (stale links); everything else
            // is worth an error-level record.
            if status == reqwest::StatusCode::NOT_FOUND {
                debug!(url = %url, "Catalog API returned 404");
            } else {
                tracing::error!(
                    status = %status,
                    body = %truncate(&response_text, 500),
                    "Catalog API returned non-success status"
                );
            }
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: api_error_message(&response_text)
                    .unwrap_or_else(|| truncate(&response_text, 200)),
            });
        }

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse catalog API response"
                );
                Err(CatalogError::Parse(e))
            }
        }
    }

    /// Get the product list, optionally filtered server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &CatalogQuery) -> Result<Vec<Product>, CatalogError> {
        let cache_key = "products".to_owned();

        // Check cache (only for unfiltered queries)
        if query.is_empty()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.fetch("products", Some(query)).await?;

        if query.is_empty() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id, or another
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let cache_key = format!("product:{id}");

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("products/{id}");
        let product: Product = match self.fetch(&path, None).await {
            Ok(product) => product,
            Err(CatalogError::Status { status: 404, .. }) => {
                return Err(CatalogError::NotFound(id.clone()));
            }
            Err(e) => return Err(e),
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, id: &ProductId) {
        let cache_key = format!("product:{id}");
        self.inner.cache.invalidate(&cache_key).await;
    }

    /// Invalidate all cached data. Called after checkout, which changes
    /// stock levels server-side.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

/// Pull the human-readable message out of an API error body, which is
/// `{"error": ...}` or occasionally `{"message": ...}`.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .or_else(|| value.get("message"))?
        .as_str()
        .map(ToOwned::to_owned)
}
