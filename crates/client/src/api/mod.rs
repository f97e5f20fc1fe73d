//! Storefront REST API client.
//!
//! # Architecture
//!
//! - One cheaply cloneable [`ApiClient`] per application, shared by the
//!   session and both collection states
//! - The backend is the source of truth - no local writes, direct API calls
//! - Product and category reads are cached in memory via `moka`; cart and
//!   wishlist reads never are
//!
//! Endpoint groups live in submodules, each adding methods to [`ApiClient`]:
//! [`auth`], [`products`], [`cart`], [`wishlist`], [`orders`], [`admin`].

pub mod admin;
pub mod auth;
mod cache;
pub mod cart;
pub mod endpoints;
pub mod orders;
pub mod products;
pub mod wishlist;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiError;

use cache::{CacheKey, CacheValue};

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const USER_AGENT: &str = concat!("shopfront-client/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Holds the bearer token for the current session. Clones share the token and
/// the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                token: RwLock::new(None),
                cache,
            }),
        })
    }

    /// The configured backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Replace (or clear) the bearer token sent with every request.
    pub async fn set_token(&self, token: Option<SecretString>) {
        *self.inner.token.write().await = token;
    }

    /// Whether a bearer token is currently set.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Resolve an endpoint path against the base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Start a request with the request ID and, if present, the bearer token.
    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        let request_id = Uuid::new_v4().to_string();
        debug!(%method, %url, %request_id, "API request");

        let mut builder = self
            .inner
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id);

        if let Some(token) = self.inner.token.read().await.as_ref() {
            builder = builder.bearer_auth(token.expose_secret());
        }

        Ok(builder)
    }

    /// Send a request and decode a JSON success body.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            debug!(
                status = %status,
                %url,
                detail = err.detail().unwrap_or(""),
                "API returned non-success status"
            );
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                %url,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path).await?;
        self.execute(builder).await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).await?.query(query);
        self.execute(builder).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).await?.json(body);
        self.execute(builder).await
    }

    pub(crate) async fn post_form<T, B>(&self, path: &str, form: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).await?.form(form);
        self.execute(builder).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path).await?;
        self.execute(builder).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).await?.json(body);
        self.execute(builder).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::DELETE, path).await?;
        self.execute(builder).await
    }
}
