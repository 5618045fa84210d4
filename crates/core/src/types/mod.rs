//! Core types for Comfy House.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartLine, CartTotals, compute_totals};
pub use id::*;
pub use price::{Price, PriceError, format_amount};
pub use product::Product;
