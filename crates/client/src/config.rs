//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPFRONT_API_BASE_URL` - Backend base URL (default: `http://localhost:8000`)
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - Client-wide request timeout (default: 30)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Product/category cache TTL (default: 300)
//!
//! ## Credentials (CLI)
//! - `SHOPFRONT_EMAIL` - Login email
//! - `SHOPFRONT_PASSWORD` - Login password (required when `SHOPFRONT_EMAIL` is set)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default backend used when `SHOPFRONT_API_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL. Always ends with `/` so endpoint paths join under it.
    pub base_url: Url,
    /// Client-wide request timeout
    pub request_timeout: Duration,
    /// How long product and category reads stay cached
    pub catalog_cache_ttl: Duration,
}

impl ClientConfig {
    /// Configuration for `base_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute
    /// `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("SHOPFRONT_API_BASE_URL", base_url)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("SHOPFRONT_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url("SHOPFRONT_API_BASE_URL", &base_url)?;
        let request_timeout =
            get_secs_or_default(&lookup, "SHOPFRONT_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let catalog_cache_ttl = get_secs_or_default(
            &lookup,
            "SHOPFRONT_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            base_url,
            request_timeout,
            catalog_cache_ttl,
        })
    }
}

/// Login credentials supplied through the environment.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Read `SHOPFRONT_EMAIL` / `SHOPFRONT_PASSWORD`.
    ///
    /// Returns `Ok(None)` when no email is configured (anonymous browsing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if an email is set without a password.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if an email is set without a password.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let Some(email) = lookup("SHOPFRONT_EMAIL").filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };
        let password = lookup("SHOPFRONT_PASSWORD")
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPFRONT_PASSWORD".to_string()))?;
        Ok(Some(Self {
            email,
            password: SecretString::from(password),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and normalize a base URL so relative endpoint paths join beneath it.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected an http(s) URL, got {raw}"),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Get a whole-seconds duration with a default value.
fn get_secs_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
