//! Integration test support for Comfy House.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p comfy-house-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_fetch` - HTTP catalog loading against an in-process feed server
//! - `storefront_flow` - full widget flows over the file-backed store

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};
use url::Url;

/// Path the feed server serves the catalog document on.
pub const CATALOG_PATH: &str = "/products.json";

/// Build one feed entry in the nested catalog shape.
#[must_use]
pub fn feed_entry(id: &str, title: &str, price: f64) -> Value {
    json!({
        "sys": { "id": id },
        "fields": {
            "title": title,
            "price": price,
            "image": { "fields": { "file": { "url": format!("./images/{id}.jpeg") } } }
        }
    })
}

/// A feed document with products `a` ($10) and `b` ($5).
#[must_use]
pub fn two_product_feed() -> String {
    json!({
        "items": [
            feed_entry("a", "queen panel bed", 10.0),
            feed_entry("b", "king panel bed", 5.0),
        ]
    })
    .to_string()
}

/// Serve `body` with `status` at [`CATALOG_PATH`] on an ephemeral port.
///
/// Returns the catalog URL. The server runs until the test runtime shuts down.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
#[allow(clippy::expect_used)]
pub async fn spawn_feed(status: StatusCode, body: String) -> Url {
    let app = Router::new().route(
        CATALOG_PATH,
        get(move || {
            let body = body.clone();
            async move { (status, body) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind feed server");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Url::parse(&format!("http://{addr}{CATALOG_PATH}")).expect("Invalid feed URL")
}
