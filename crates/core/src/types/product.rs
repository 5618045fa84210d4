//! Catalog product snapshot.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A purchasable product in its canonical shape.
///
/// Products are immutable once loaded. The same shape is persisted under the
/// `products` storage key and flattened into every [`CartLine`](super::CartLine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Image URL exactly as published by the feed (may be relative).
    pub image: String,
}
