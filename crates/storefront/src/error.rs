//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for callers that drive the widget (the
//! CLI). Errors that escape to the top level go through [`AppError::capture`],
//! which reports them to Sentry before logging.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront widget.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog fetch or normalization failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Persistent storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Template rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Report the error to Sentry and log it.
    ///
    /// Contract violations on the cart (unknown ids, duplicates, amount
    /// overflow) are logged as warnings only; everything else is captured as
    /// a Sentry event.
    pub fn capture(&self) {
        if matches!(
            self,
            Self::Cart(
                CartError::NotFound(_)
                    | CartError::AlreadyInCart(_)
                    | CartError::UnknownProduct(_)
                    | CartError::AmountOverflow(_)
            )
        ) {
            tracing::warn!(error = %self, "Cart operation rejected");
            return;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Storefront error"
        );
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error. Without an initialized Sentry client this
/// is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
