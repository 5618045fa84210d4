//! Raw catalog feed document and its normalization into [`Product`].
//!
//! The feed nests every field a few levels deep:
//!
//! ```json
//! { "items": [ {
//!     "sys": { "id": "1" },
//!     "fields": {
//!       "title": "queen panel bed",
//!       "price": 10.99,
//!       "image": { "fields": { "file": { "url": "./images/product-1.jpeg" } } }
//!     }
//! } ] }
//! ```
//!
//! Every level is optional on the wire so a missing field can be reported by
//! its dotted path instead of a generic serde error.

use comfy_house_core::{Price, Product, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::CatalogError;

#[derive(Debug, Deserialize)]
struct FeedDocument {
    items: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    sys: Option<FeedSys>,
    fields: Option<FeedFields>,
}

#[derive(Debug, Deserialize)]
struct FeedSys {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedFields {
    title: Option<String>,
    price: Option<Decimal>,
    image: Option<FeedImage>,
}

#[derive(Debug, Deserialize)]
struct FeedImage {
    fields: Option<FeedImageFields>,
}

#[derive(Debug, Deserialize)]
struct FeedImageFields {
    file: Option<FeedFile>,
}

#[derive(Debug, Deserialize)]
struct FeedFile {
    url: Option<String>,
}

fn missing(index: usize, field: &'static str) -> CatalogError {
    CatalogError::MissingField { index, field }
}

impl FeedEntry {
    fn into_product(self, index: usize) -> Result<Product, CatalogError> {
        let fields = self.fields.ok_or_else(|| missing(index, "fields"))?;
        let title = fields.title.ok_or_else(|| missing(index, "fields.title"))?;
        let amount = fields.price.ok_or_else(|| missing(index, "fields.price"))?;
        let price =
            Price::new(amount).map_err(|source| CatalogError::InvalidPrice { index, source })?;
        let id = self
            .sys
            .and_then(|sys| sys.id)
            .ok_or_else(|| missing(index, "sys.id"))?;
        let image = fields
            .image
            .and_then(|image| image.fields)
            .and_then(|fields| fields.file)
            .and_then(|file| file.url)
            .ok_or_else(|| missing(index, "fields.image.fields.file.url"))?;

        Ok(Product {
            id: ProductId::new(id),
            title,
            price,
            image,
        })
    }
}

/// Parse a feed document and normalize every entry.
///
/// A single malformed entry fails the whole catalog.
///
/// # Errors
///
/// Returns `CatalogError::Parse` for invalid JSON, or the first entry's
/// `MissingField` / `InvalidPrice` error.
pub fn parse_catalog(body: &str) -> Result<Vec<Product>, CatalogError> {
    let document: FeedDocument = serde_json::from_str(body)?;
    document
        .items
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_product(index))
        .collect()
}
