//! Cart lines, the cart sequence, and derived totals.
//!
//! The cart is an ordered sequence of lines in insertion order. Each line is a
//! denormalized snapshot of a [`Product`] plus a mutable `amount`. Totals are
//! never stored; [`Cart::totals`] recomputes them from the lines every time.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::format_amount;
use super::product::Product;

/// One entry in the cart.
///
/// Serialized with the product fields flattened next to `amount`, e.g.
/// `{"id":"a","title":"Sofa","price":"10","image":"./a.jpeg","amount":1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    /// Quantity, always at least 1 while the line is in a cart.
    #[serde(deserialize_with = "nonzero_amount")]
    pub amount: u32,
}

/// Stored lines with an amount of 0 are rejected.
fn nonzero_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    NonZeroU32::deserialize(deserializer).map(NonZeroU32::get)
}

impl CartLine {
    /// Create a fresh line for `product` with an amount of 1.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    /// The product id this line refers to.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Price multiplied by amount.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * self.amount
    }
}

/// Item count and money total derived from a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of `amount` over all lines.
    pub item_count: u64,
    /// Sum of `price * amount` over all lines, rounded to 2 decimal places.
    pub total: Decimal,
}

impl CartTotals {
    /// Total formatted for display, e.g. `$25.00`.
    #[must_use]
    pub fn display_total(&self) -> String {
        format_amount(self.total)
    }
}

/// Ordered collection of cart lines.
///
/// Persisted as a bare JSON array of [`CartLine`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether a line exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.line(id).is_some()
    }

    /// Find the line for `id`.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Find the line for `id`, mutably.
    pub fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }

    /// Ids of every line, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|line| line.id().clone()).collect()
    }

    /// Append a line to the end of the cart.
    ///
    /// Callers are responsible for id uniqueness; the cart store checks it
    /// before pushing.
    pub fn push(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    /// Remove and return the line for `id`, if present.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| line.id() == id)?;
        Some(self.lines.remove(index))
    }

    /// Recompute item count and total from the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        compute_totals(self)
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }
}

/// Compute `{item_count, total}` for a cart from scratch.
#[must_use]
pub fn compute_totals(cart: &Cart) -> CartTotals {
    let item_count = cart.lines.iter().map(|line| u64::from(line.amount)).sum();
    let total = cart
        .lines
        .iter()
        .map(CartLine::subtotal)
        .sum::<Decimal>()
        .round_dp(2);

    CartTotals { item_count, total }
}
