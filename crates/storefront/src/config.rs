//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_BASE_URL` - Base URL the catalog path is resolved against
//!   (default: `http://127.0.0.1:3000/`)
//! - `STOREFRONT_CATALOG_PATH` - Catalog document path (default: `products.json`)
//! - `STOREFRONT_STORAGE_DIR` - Directory for the persistent key-value store
//!   (default: `.comfy-house`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/";
const DEFAULT_CATALOG_PATH: &str = "products.json";
const DEFAULT_STORAGE_DIR: &str = ".comfy-house";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront widget configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Fully resolved URL of the catalog document
    pub catalog_url: Url,
    /// Directory backing the persistent key-value store
    pub storage_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL or catalog path is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL or catalog path is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("STOREFRONT_BASE_URL")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let catalog_path = lookup("STOREFRONT_CATALOG_PATH")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string());
        let catalog_url = base_url.join(&catalog_path).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_CATALOG_PATH".to_string(), e.to_string())
        })?;

        let storage_dir = lookup("STOREFRONT_STORAGE_DIR")
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);

        Ok(Self {
            catalog_url,
            storage_dir,
            sentry_dsn: lookup("SENTRY_DSN").filter(|value| !value.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}
