//! Catalog and auth service client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; the catalog service is the source of truth
//! - GET responses are cached in memory via `moka` (TTL from config,
//!   5 minutes by default)
//! - No retries: a failed request is reported to the caller as is
//!
//! # Endpoints
//!
//! | Method | Path                        | Used by                      |
//! |--------|-----------------------------|------------------------------|
//! | GET    | `/products`                 | [`CatalogClient::products`]  |
//! | GET    | `/products/{id}`            | [`CatalogClient::product`]   |
//! | GET    | `/categories`               | [`CatalogClient::categories`]|
//! | GET    | `/categories/{id}/products` | [`CatalogClient::products_by_category`] |
//! | POST   | `/auth/login`               | [`CatalogClient::login`]     |
//! | POST   | `/users`                    | [`CatalogClient::register`]  |
//! | GET    | `/auth/profile`             | [`CatalogClient::profile`]   |
//!
//! # Example
//!
//! ```rust,ignore
//! let client = CatalogClient::new(&config.catalog);
//! let featured = client.featured_products().await?;
//! let token = client.login("jane@example.com", "secret").await?;
//! let me = client.profile(&token).await?;
//! ```

mod cache;
mod filter;
mod types;

pub use filter::{DEFAULT_MAX_PRICE, ProductFilter};
pub use types::{AccessToken, NewUser, avatar_url};

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument};

use vitrine_core::{Category, CategoryId, Product, ProductId, User};

use crate::config::CatalogConfig;
use cache::{CacheKey, CacheValue};
use types::{LoginBody, RegisterBody, TokenResponse};

/// Number of products in the home page's featured grid.
pub const FEATURED_COUNT: usize = 8;

/// Longest slice of a response body kept in errors and logs.
const MAX_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with an unexpected status.
    #[error("Catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials or token were rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog and auth service.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    /// Base URL requests are sent to, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<String, CatalogError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(CatalogError::Unauthorized),
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound(resource.to_string())),
            // The service reports unknown ids as 400 with an explanatory message.
            StatusCode::BAD_REQUEST if is_not_found_message(&body) => {
                Err(CatalogError::NotFound(resource.to_string()))
            }
            _ => {
                let body = truncate_body(&body);
                error!(status = %status, body = %body, "Catalog returned non-success status");
                Err(CatalogError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    fn parse<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
        serde_json::from_str(body).map_err(|e| {
            error!(error = %e, body = %truncate_body(body), "Failed to parse catalog response");
            CatalogError::Parse(e)
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let body = self
            .send(self.inner.client.get(self.url(path)), path)
            .await?;
        Self::parse(&body)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, CatalogError> {
        let request = self.inner.client.post(self.url(path)).json(payload);
        let body = self.send(request, path).await?;
        Self::parse(&body)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("/products").await?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get_json(&format!("/products/{id}")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the products of one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category = %id))]
    pub async fn products_by_category(&self, id: CategoryId) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::CategoryProducts(id);

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json(&format!("/categories/{id}/products")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// The first [`FEATURED_COUNT`] products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn featured_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut products = self.products().await?;
        products.truncate(FEATURED_COUNT);
        Ok(products)
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json("/categories").await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Auth Methods (never cached)
    // =========================================================================

    /// Exchange credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unauthorized`] for rejected credentials, or an
    /// error if the API request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, CatalogError> {
        let response: TokenResponse = self
            .post_json("/auth/login", &LoginBody { email, password })
            .await?;
        Ok(AccessToken::new(response.access_token))
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the account or the request
    /// fails.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<User, CatalogError> {
        self.post_json("/users", &RegisterBody::from(user)).await
    }

    /// Profile of the user owning `token`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unauthorized`] if the token is rejected, or an
    /// error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &AccessToken) -> Result<User, CatalogError> {
        let request = self
            .inner
            .client
            .get(self.url("/auth/profile"))
            .bearer_auth(token.expose());
        let body = self.send(request, "/auth/profile").await?;
        Self::parse(&body)
    }
}

fn is_not_found_message(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("could not find") || lower.contains("not found")
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_BODY_CHARS).collect()
}
