//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Storefront bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Storefront listen port (default: 3000)
//! - `ADMIN_HOST` - Admin bind address (default: 127.0.0.1, keep it private)
//! - `ADMIN_PORT` - Admin listen port (default: 3001)
//! - `ADMIN_TOKEN` - Bearer token required by the admin router (unset: no check)
//! - `LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//! - `PICKUP_LOCATION_POLICY` - `lenient` or `strict` (default: lenient)
//! - `PICKUP_LOCATION_SEEDS` - Comma-separated locations offered before any order has one
//! - `PICKUP_LOCATION_LABEL` - Checkout field label (default: Pickup Locations)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address the public storefront binds to
    pub host: IpAddr,
    /// Port the public storefront listens on
    pub port: u16,
    /// IP address the admin router binds to
    pub admin_host: IpAddr,
    /// Port the admin router listens on
    pub admin_port: u16,
    /// Bearer token guarding the admin router
    pub admin_token: Option<SecretString>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry settings
    pub sentry: SentryConfig,
    /// Pickup-location checkout field settings
    pub pickup: PickupConfig,
}

/// Log output format for the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

/// How the order field writer treats submitted pickup locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Store whatever was submitted (escaped), including the empty string.
    #[default]
    Lenient,
    /// Require a known, non-empty location whenever any location is known.
    Strict,
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("expected 'lenient' or 'strict', got '{other}'")),
        }
    }
}

/// Pickup-location checkout field configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupConfig {
    /// Validation applied when an order is created
    pub policy: WritePolicy,
    /// Locations offered ahead of the ones recorded on past orders
    pub seeds: Vec<String>,
    /// Label shown above the select
    pub label: String,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            policy: WritePolicy::Lenient,
            seeds: Vec::new(),
            label: DEFAULT_PICKUP_LABEL.to_owned(),
        }
    }
}

const DEFAULT_PICKUP_LABEL: &str = "Pickup Locations";

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_database_url("STOREFRONT_DATABASE_URL")?,
            host: get_parsed_or_default("STOREFRONT_HOST", "127.0.0.1")?,
            port: get_parsed_or_default("STOREFRONT_PORT", "3000")?,
            admin_host: get_parsed_or_default("ADMIN_HOST", "127.0.0.1")?,
            admin_port: get_parsed_or_default("ADMIN_PORT", "3001")?,
            admin_token: get_optional_env("ADMIN_TOKEN")
                .filter(|token| !token.trim().is_empty())
                .map(SecretString::from),
            log_format: get_parsed_or_default("LOG_FORMAT", "pretty")?,
            sentry: SentryConfig::from_env()?,
            pickup: PickupConfig::from_env()?,
        })
    }

    /// Returns the socket address for the public storefront.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the socket address for the admin router.
    #[must_use]
    pub const fn admin_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.admin_host, self.admin_port)
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: get_parsed_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: get_parsed_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

impl PickupConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            policy: get_parsed_or_default("PICKUP_LOCATION_POLICY", "lenient")?,
            seeds: get_optional_env("PICKUP_LOCATION_SEEDS")
                .map(|raw| parse_seed_list(&raw))
                .unwrap_or_default(),
            label: get_optional_env("PICKUP_LOCATION_LABEL")
                .map(|label| label.trim().to_owned())
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| DEFAULT_PICKUP_LABEL.to_owned()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Split a comma-separated list, trimming entries and dropping empty ones.
fn parse_seed_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
