//! Catalog loading.
//!
//! The catalog is fetched once at startup from a read-only JSON feed and
//! normalized into [`Product`]s. Fetch failures never reach the view: callers
//! go through [`load_catalog`], which logs the error and yields an empty list.
//!
//! # Example
//!
//! ```rust,ignore
//! use comfy_house_storefront::catalog::{CatalogClient, load_catalog};
//!
//! let client = CatalogClient::new(config.catalog_url.clone());
//! let products = load_catalog(&client).await;
//! ```

mod feed;

pub use feed::parse_catalog;

use std::future::Future;

use comfy_house_core::{PriceError, Product};
use thiserror::Error;
use tracing::{error, info, instrument};
use url::Url;

/// Errors that can occur when fetching or normalizing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("catalog request returned status {0}")]
    Status(u16),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A feed entry lacks a required field.
    #[error("catalog entry {index} is missing '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// A feed entry carries an unusable price.
    #[error("catalog entry {index} has an invalid price: {source}")]
    InvalidPrice {
        index: usize,
        #[source]
        source: PriceError,
    },
}

/// A source of catalog products.
pub trait CatalogSource {
    /// Fetch and normalize the full catalog in one request.
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>>;
}

/// Fetch the catalog, degrading any failure to an empty list.
///
/// The error is logged; there is no retry.
pub async fn load_catalog<C: CatalogSource>(source: &C) -> Vec<Product> {
    match source.fetch_catalog().await {
        Ok(products) => {
            info!(count = products.len(), "Catalog loaded");
            products
        }
        Err(e) => {
            error!(error = %e, "Failed to load catalog");
            Vec::new()
        }
    }
}

/// HTTP client for the catalog feed.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    url: Url,
}

impl CatalogClient {
    /// Create a client for the feed at `url`.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// URL of the catalog document.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl CatalogSource for CatalogClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_catalog(&body)
    }
}
