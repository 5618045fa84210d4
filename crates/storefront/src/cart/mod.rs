//! Cart state management.
//!
//! [`CartStore`] owns the in-memory cart and is the only thing that mutates
//! it. Every mutation is written through to [`Storage`](crate::storage::Storage)
//! before the call returns.
//!
//! # Line lifecycle
//!
//! ```text
//! absent --add--> present(1)
//! present(n) --increment--> present(n + 1)
//! present(n) --decrement--> present(n - 1)   (n > 1)
//! present(1) --decrement--> absent
//! present(n) --remove/clear--> absent
//! ```
//!
//! Incrementing or decrementing an absent line is [`CartError::NotFound`].

mod store;

pub use store::CartStore;

use comfy_house_core::{ControlId, ProductId};
use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No line exists for the product.
    #[error("no cart line for product '{0}'")]
    NotFound(ProductId),

    /// The product already has a line; adding it again would duplicate it.
    #[error("product '{0}' is already in the cart")]
    AlreadyInCart(ProductId),

    /// The line's amount is already at its maximum.
    #[error("amount of product '{0}' cannot be increased further")]
    AmountOverflow(ProductId),

    /// The product is not part of the persisted catalog snapshot.
    #[error("product '{0}' is not in the catalog")]
    UnknownProduct(ProductId),

    /// Reading or writing persisted state failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Outcome of decrementing a line's amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountChange {
    /// The line is still present with this amount.
    Updated(u32),
    /// The amount reached zero and the line was removed. Carries the add
    /// control to re-enable, if one was registered.
    Removed(Option<ControlId>),
}
