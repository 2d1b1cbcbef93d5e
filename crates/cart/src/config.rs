//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CART_API_BASE_URL` - Stock/product service URL (default: <http://localhost:3333>)
//! - `CART_API_TOKEN` - Bearer token sent to the stock/product service
//! - `CART_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `CART_PRODUCT_CACHE_TTL_SECS` - Product cache lifetime in seconds (default: 300)
//! - `CART_STORAGE_PATH` - File used for durable storage (default: .rocketshoes/storage.json)
//! - `CART_STORAGE_KEY` - Storage key holding the cart (default: @RocketShoes:cart)
//! - `CART_LOCALE` - Notification language, `en` or `pt-BR` (default: pt-BR)
//! - `CART_LOG_JSON` - Emit JSON logs (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::notify::Locale;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";

/// Storage key the cart is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Stock/product service configuration
    pub api: ApiConfig,
    /// File backing the durable key-value storage
    pub storage_path: PathBuf,
    /// Key the serialized cart is stored under
    pub storage_key: String,
    /// Language for user-facing notifications
    pub locale: Locale,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Stock/product service configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; `/stock/{id}` and `/products/{id}` are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product catalog lookups stay cached
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl CartConfig {
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

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let api = ApiConfig {
            base_url: parse_base_url(&env.get_or_default("CART_API_BASE_URL", DEFAULT_API_BASE_URL))?,
            token: env.get("CART_API_TOKEN").map(SecretString::from),
            timeout: Duration::from_secs(
                env.parse_or("CART_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            ),
            product_cache_ttl: Duration::from_secs(env.parse_or(
                "CART_PRODUCT_CACHE_TTL_SECS",
                DEFAULT_PRODUCT_CACHE_TTL_SECS,
            )?),
        };

        Ok(Self {
            api,
            storage_path: PathBuf::from(env.get_or_default("CART_STORAGE_PATH", DEFAULT_STORAGE_PATH)),
            storage_key: env.get_or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY),
            locale: env.parse_or("CART_LOCALE", Locale::default())?,
            log_json: env.parse_or("CART_LOG_JSON", false)?,
            sentry_dsn: env.get("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as absent.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when absent.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse and check the service base URL.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("CART_API_BASE_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "CART_API_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}
