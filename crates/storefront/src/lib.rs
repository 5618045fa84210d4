//! Comfy House Storefront library.
//!
//! A storefront widget: fetch a product catalog, render product cards, and
//! manage a shopping cart persisted in a key-value store.
//!
//! # Architecture
//!
//! - [`catalog`] - one-shot catalog fetch and normalization (`reqwest`)
//! - [`storage`] - key-value persistence substrate (memory or file backed)
//! - [`cart`] - cart store owning the cart and writing it through to storage
//! - [`view`] - surface contract, askama templates and the view binder
//!
//! # Startup
//!
//! ```rust,ignore
//! use comfy_house_storefront::{cart::CartStore, catalog::CatalogClient,
//!     storage::FileStorage, view::{HtmlSurface, ViewBinder}};
//!
//! let mut store = CartStore::new(FileStorage::new(&config.storage_dir));
//! let mut surface = HtmlSurface::new();
//! let client = CatalogClient::new(config.catalog_url.clone());
//!
//! let mut binder = ViewBinder::new(&mut store, &mut surface);
//! binder.start(&client).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
pub mod view;
