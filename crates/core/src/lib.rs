//! Comfy House Core - Shared cart and catalog types.
//!
//! This crate provides the data model used across the Comfy House components:
//! - `storefront` - Catalog loader, cart store and view binder
//! - `cli` - Command-line driver for the storefront widget
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. Totals are computed here so every caller agrees on
//! the arithmetic.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, products, cart lines and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
