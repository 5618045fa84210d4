//! Command implementations.
//!
//! Every command opens the file-backed store, restores the cart into a fresh
//! [`HtmlSurface`] and then drives the widget through its view binder, the
//! same way a page load followed by a click would.

use std::io::Write;
use std::path::Path;

use comfy_house_storefront::cart::CartStore;
use comfy_house_storefront::catalog::CatalogClient;
use comfy_house_storefront::config::StorefrontConfig;
use comfy_house_storefront::error::Result;
use comfy_house_storefront::storage::{self, FileStorage};
use comfy_house_storefront::view::{HtmlSurface, UiEvent, ViewBinder};
use tracing::{info, warn};

/// Widget state for one command invocation.
struct Widget {
    store: CartStore<FileStorage>,
    surface: HtmlSurface,
}

impl Widget {
    fn open(config: &StorefrontConfig) -> Self {
        Self {
            store: CartStore::new(FileStorage::new(&config.storage_dir)),
            surface: HtmlSurface::new(),
        }
    }

    fn binder(&mut self) -> ViewBinder<'_, FileStorage, HtmlSurface> {
        ViewBinder::new(&mut self.store, &mut self.surface)
    }

    fn log_totals(&self) {
        let totals = self.store.totals();
        info!(
            lines = self.store.cart().len(),
            items = totals.item_count,
            total = %totals.display_total(),
            "Cart updated"
        );
    }
}

/// Fetch the catalog, persist it, and list the products.
///
/// # Errors
///
/// Returns an error if storage fails or rendering fails.
pub async fn catalog(config: &StorefrontConfig) -> Result<()> {
    let client = CatalogClient::new(config.catalog_url.clone());
    let mut widget = Widget::open(config);

    let products = widget.binder().start(&client).await?;
    if products.is_empty() {
        warn!(url = %config.catalog_url, "Catalog is empty");
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    for product in &products {
        writeln!(out, "{:<12} {:<32} {:>10}", product.id, product.title, product.price)?;
    }
    Ok(())
}

/// Replay a UI event against the persisted cart.
///
/// Add controls are bound from the stored catalog snapshot, so `catalog`
/// must have run at least once for adds to succeed.
///
/// # Errors
///
/// Returns the cart error for rejected operations, or storage errors.
pub fn dispatch(config: &StorefrontConfig, event: UiEvent) -> Result<()> {
    let mut widget = Widget::open(config);
    let products = storage::load_products(widget.store.storage())?;

    {
        let mut binder = widget.binder();
        binder.restore()?;
        binder.render_catalog(&products)?;
        binder.bind_add_controls(&products);
        binder.dispatch(event)?;
    }

    widget.log_totals();
    Ok(())
}

/// Print the persisted cart.
///
/// # Errors
///
/// Returns an error if the stored cart cannot be read.
pub fn show_cart(config: &StorefrontConfig) -> Result<()> {
    let mut store = CartStore::new(FileStorage::new(&config.storage_dir));
    let cart = store.restore()?;
    let totals = cart.totals();

    let mut out = std::io::stdout().lock();
    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for line in cart.lines() {
        writeln!(
            out,
            "{:<12} {:<32} {:>10} x{:<4} {:>10}",
            line.id(),
            line.product.title,
            line.product.price,
            line.amount,
            comfy_house_core::format_amount(line.subtotal())
        )?;
    }
    writeln!(
        out,
        "{} item(s), total {}",
        totals.item_count,
        totals.display_total()
    )?;
    Ok(())
}

/// Run the startup sequence and write the rendered page.
///
/// # Errors
///
/// Returns an error if storage, rendering or writing the output fails.
pub async fn render(config: &StorefrontConfig, output: Option<&Path>) -> Result<()> {
    let client = CatalogClient::new(config.catalog_url.clone());
    let mut widget = Widget::open(config);
    widget.binder().start(&client).await?;

    let page = widget.surface.document()?;
    match output {
        Some(path) => {
            tokio::fs::write(path, page).await?;
            info!(path = %path.display(), "Page written");
        }
        None => std::io::stdout().lock().write_all(page.as_bytes())?,
    }
    Ok(())
}
