//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: http://localhost:3000)
//! - `STOREFRONT_DATA_DIR` - Directory for persisted carts (default: data/carts)
//! - `STOREFRONT_CART_IDLE_SECS` - Seconds before an unused cart is dropped from memory (default: 1800)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Root directory for persisted carts
    pub data_dir: PathBuf,
    /// How long an unused cart stays in memory
    pub cart_idle_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            data_dir: PathBuf::from("data/carts"),
            cart_idle_timeout: Duration::from_secs(30 * 60),
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
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let host = parse_env("STOREFRONT_HOST", defaults.host)?;
        let port = parse_env("STOREFRONT_PORT", defaults.port)?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", &defaults.base_url);
        let data_dir = get_optional_env("STOREFRONT_DATA_DIR")
            .map_or(defaults.data_dir, PathBuf::from);
        let idle_secs = parse_env(
            "STOREFRONT_CART_IDLE_SECS",
            defaults.cart_idle_timeout.as_secs(),
        )?;
        if idle_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_CART_IDLE_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            data_dir,
            cart_idle_timeout: Duration::from_secs(idle_secs),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            ..StorefrontConfig::default()
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.data_dir, PathBuf::from("data/carts"));
        assert_eq!(config.cart_idle_timeout, Duration::from_secs(1800));
        assert!(!config.is_secure());
    }

    #[test]
    fn test_is_secure() {
        let config = StorefrontConfig {
            base_url: "https://heirloom.shop".to_string(),
            ..StorefrontConfig::default()
        };
        assert!(config.is_secure());
    }

    #[test]
    fn test_parse_value_valid() {
        let port: u16 = parse_value("STOREFRONT_PORT", " 4000 ").unwrap();
        assert_eq!(port, 4000);
    }

    #[test]
    fn test_parse_value_invalid() {
        let result = parse_value::<u16>("STOREFRONT_PORT", "not-a-port");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
        assert!(err.to_string().contains("STOREFRONT_PORT"));
    }

    #[test]
    fn test_parse_value_invalid_host() {
        assert!(parse_value::<IpAddr>("STOREFRONT_HOST", "localhost:80").is_err());
    }
}
