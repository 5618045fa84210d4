//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog feeds publish prices as plain JSON numbers (`10.99`). They are
//! parsed straight into a [`Decimal`] so cart totals never pick up binary
//! floating point error.

use std::fmt;
use std::ops::Mul;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// Prices cannot be below zero.
    #[error("price must not be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative unit price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a count of cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `cents` is below zero.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Mul<u32> for Price {
    type Output = Decimal;

    fn mul(self, amount: u32) -> Decimal {
        self.0 * Decimal::from(amount)
    }
}

/// Format an amount for display, e.g. `$19.99`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_amount(self.0))
    }
}
