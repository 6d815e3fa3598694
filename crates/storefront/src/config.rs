//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `VITRINE_API_URL` - Catalog service base URL (default: <https://api.escuelajs.co/api/v1>)
//! - `VITRINE_DATA_DIR` - Directory holding the cart, favorites and token (default: `.vitrine`)
//! - `VITRINE_CACHE_TTL_SECS` - Lifetime of cached catalog responses (default: 300)
//! - `VITRINE_CACHE_CAPACITY` - Maximum cached catalog responses (default: 1000)
//! - `VITRINE_CURRENCY` - Display currency: BRL, USD, EUR or GBP (default: BRL)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use vitrine_core::CurrencyCode;

const DEFAULT_API_URL: &str = "https://api.escuelajs.co/api/v1";
const DEFAULT_DATA_DIR: &str = ".vitrine";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog service client configuration
    pub catalog: CatalogConfig,
    /// Directory backing local storage
    pub data_dir: PathBuf,
    /// Currency prices are displayed in
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog service client configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL every endpoint path is appended to
    pub api_url: Url,
    /// Lifetime of cached GET responses
    pub cache_ttl: Duration,
    /// Maximum number of cached responses
    pub cache_capacity: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| unreachable!()),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            currency: CurrencyCode::default(),
            sentry_dsn: None,
            sentry_environment: None,
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

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let catalog = CatalogConfig::from_lookup(&lookup)?;
        let data_dir = PathBuf::from(get_env_or_default(&lookup, "VITRINE_DATA_DIR", DEFAULT_DATA_DIR));
        let currency = get_env_or_default(&lookup, "VITRINE_CURRENCY", "BRL")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("VITRINE_CURRENCY".to_string(), e.to_string()))?;

        Ok(Self {
            catalog,
            data_dir,
            currency,
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }
}

impl CatalogConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(&get_env_or_default(lookup, "VITRINE_API_URL", DEFAULT_API_URL))?;

        let ttl_secs = parse_positive(lookup, "VITRINE_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let cache_capacity =
            parse_positive(lookup, "VITRINE_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;

        Ok(Self {
            api_url,
            cache_ttl: Duration::from_secs(ttl_secs),
            cache_capacity,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Parse a strictly positive integer, falling back to `default` when unset.
fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = get_optional_env(lookup, key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Validate the catalog base URL: absolute HTTP(S) with a path that can be
/// extended.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("VITRINE_API_URL".to_string(), reason);

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(invalid("must be an absolute URL with a host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment".to_string()));
    }
    Ok(url)
}
