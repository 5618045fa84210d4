//! View binder: keeps the surface in step with the cart store.
//!
//! Every user event becomes a cart store operation followed by a targeted
//! update of the affected fragment and the totals. The binder itself holds no
//! state beyond its two borrows.

use askama::Template;
use comfy_house_core::{CartLine, ControlId, Product, ProductId};
use tracing::{debug, info, instrument, warn};

use super::surface::{CartAction, ClickTarget, ControlState, Region, Surface};
use super::templates::{CartLineTemplate, CartLineView, ProductCardView, ProductCardsTemplate};
use crate::cart::{AmountChange, CartError, CartStore};
use crate::catalog::{CatalogSource, load_catalog};
use crate::error::{AppError, Result};
use crate::storage::Storage;

/// Class shown on the cart panel while it is open.
const SHOW_CART_CLASS: &str = "showCart";
/// Class shown on the overlay while the cart panel is open.
const OVERLAY_VISIBLE_CLASS: &str = "transparentBcg";

/// User interaction events delivered by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The cart button in the navbar.
    OpenCart,
    /// The close button of the cart panel.
    CloseCart,
    /// The clear-cart button.
    ClearCart,
    /// An add control on a product card.
    AddToCart(ProductId),
    /// Any click inside the cart content.
    CartClick(ClickTarget),
}

/// Renders store state into a surface and routes events back to the store.
pub struct ViewBinder<'a, S, V> {
    store: &'a mut CartStore<S>,
    surface: &'a mut V,
}

impl<'a, S: Storage, V: Surface> ViewBinder<'a, S, V> {
    pub fn new(store: &'a mut CartStore<S>, surface: &'a mut V) -> Self {
        Self { store, surface }
    }

    #[must_use]
    pub fn store(&self) -> &CartStore<S> {
        &*self.store
    }

    #[must_use]
    pub fn surface(&self) -> &V {
        &*self.surface
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Restore the persisted cart and render every line plus the totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart cannot be read or a line fails to render.
    pub fn restore(&mut self) -> Result<()> {
        let lines = self.store.restore()?.lines().to_vec();
        for line in &lines {
            self.render_cart_line(line)?;
        }
        self.render_totals();
        debug!(lines = lines.len(), "Rendered restored cart");
        Ok(())
    }

    /// Full startup: restore the cart, then load, render, persist and bind
    /// the catalog.
    ///
    /// A failed catalog fetch renders an empty grid and leaves the previously
    /// persisted catalog snapshot untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or a template fails to render.
    #[instrument(skip_all)]
    pub async fn start<C: CatalogSource>(&mut self, source: &C) -> Result<Vec<Product>> {
        self.restore()?;

        let products = load_catalog(source).await;
        self.render_catalog(&products)?;
        if !products.is_empty() {
            self.store.save_catalog(&products)?;
        }
        self.bind_add_controls(&products);

        info!(
            products = products.len(),
            cart_lines = self.store.cart().len(),
            "Storefront ready"
        );
        Ok(products)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Replace the catalog grid with one card per product.
    ///
    /// Products already in the cart render with a disabled "In Cart" control.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Render` if the template fails.
    pub fn render_catalog(&mut self, products: &[Product]) -> Result<()> {
        let cards = products
            .iter()
            .map(|product| ProductCardView::new(product, self.control_state_for(&product.id)))
            .collect();
        let html = ProductCardsTemplate { cards }.render()?;
        self.surface.replace_region(Region::CatalogGrid, html);
        Ok(())
    }

    /// Append the fragment for one cart line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Render` if the template fails.
    pub fn render_cart_line(&mut self, line: &CartLine) -> Result<()> {
        let html = CartLineTemplate {
            line: CartLineView::from(line),
        }
        .render()?;
        self.surface.append_line(line.id(), html);
        Ok(())
    }

    /// Write the current totals into the total and item-count regions.
    pub fn render_totals(&mut self) {
        let totals = self.store.totals();
        self.surface
            .set_text(Region::CartTotal, &totals.display_total());
        self.surface
            .set_text(Region::CartItemCount, &totals.item_count.to_string());
    }

    /// Mount and register an add control for every product.
    ///
    /// Controls of products already in the cart are disabled straight away.
    pub fn bind_add_controls(&mut self, products: &[Product]) {
        for product in products {
            let control = self.surface.mount_add_control(&product.id);
            let state = self.control_state_for(&product.id);
            if state != ControlState::available() {
                self.surface.set_control(&control, state);
            }
            self.store.register_control(product.id.clone(), control);
        }
    }

    pub fn show_cart_panel(&mut self) {
        self.surface
            .add_class(Region::CartOverlay, OVERLAY_VISIBLE_CLASS);
        self.surface.add_class(Region::CartPanel, SHOW_CART_CLASS);
    }

    pub fn hide_cart_panel(&mut self) {
        self.surface
            .remove_class(Region::CartOverlay, OVERLAY_VISIBLE_CLASS);
        self.surface.remove_class(Region::CartPanel, SHOW_CART_CLASS);
    }

    fn control_state_for(&self, id: &ProductId) -> ControlState {
        if self.store.cart().contains(id) {
            ControlState::in_cart()
        } else {
            ControlState::available()
        }
    }

    fn release_control(&mut self, control: Option<ControlId>) {
        if let Some(control) = control {
            self.surface.set_control(&control, ControlState::available());
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Route a UI event to its handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub fn dispatch(&mut self, event: UiEvent) -> Result<()> {
        debug!(?event, "Dispatching UI event");
        match event {
            UiEvent::OpenCart => {
                self.show_cart_panel();
                Ok(())
            }
            UiEvent::CloseCart => {
                self.hide_cart_panel();
                Ok(())
            }
            UiEvent::ClearCart => self.clear_cart(),
            UiEvent::AddToCart(id) => self.on_add_click(&id),
            UiEvent::CartClick(target) => self.on_cart_click(&target),
        }
    }

    /// Handle a click on a product's add control.
    ///
    /// # Errors
    ///
    /// Returns the cart error if the product cannot be added; the control is
    /// re-enabled unless the product is already in the cart.
    pub fn on_add_click(&mut self, id: &ProductId) -> Result<()> {
        let control = self.store.control(id).cloned();
        if let Some(control) = &control {
            self.surface.set_control(control, ControlState::in_cart());
        }

        let line = match self.store.add_item(id) {
            Ok(line) => line.clone(),
            Err(e) => {
                if !matches!(e, CartError::AlreadyInCart(_)) {
                    self.release_control(control);
                }
                return Err(e.into());
            }
        };

        self.render_cart_line(&line)?;
        self.render_totals();
        self.show_cart_panel();
        Ok(())
    }

    /// Delegated handler for clicks inside the cart content.
    ///
    /// Clicks on a line whose id is not in the cart are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` if persisting the change fails.
    pub fn on_cart_click(&mut self, target: &ClickTarget) -> Result<()> {
        let Some(action) = CartAction::from_target(target) else {
            return Ok(());
        };

        match self.apply_cart_action(&action) {
            Err(AppError::Cart(CartError::NotFound(id))) => {
                warn!(product_id = %id, ?action, "Cart click for a line that is not in the cart");
                Ok(())
            }
            other => other,
        }
    }

    fn apply_cart_action(&mut self, action: &CartAction) -> Result<()> {
        match action {
            CartAction::Remove(id) => {
                let control = self.store.remove_item(id)?;
                self.surface.remove_line(id);
                self.release_control(control);
            }
            CartAction::Increment(id) => {
                let amount = self.store.increment_amount(id)?;
                self.surface.set_line_amount(id, amount);
            }
            CartAction::Decrement(id) => match self.store.decrement_amount(id)? {
                AmountChange::Updated(amount) => self.surface.set_line_amount(id, amount),
                AmountChange::Removed(control) => {
                    self.surface.remove_line(id);
                    self.release_control(control);
                }
            },
        }

        self.render_totals();
        Ok(())
    }

    /// Empty the cart, re-enable every add control and close the panel.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` if persisting the empty cart fails.
    pub fn clear_cart(&mut self) -> Result<()> {
        let ids = self.store.cart().ids();
        let controls = self.store.clear()?;

        for id in &ids {
            self.surface.remove_line(id);
        }
        for control in controls {
            self.release_control(Some(control));
        }

        self.render_totals();
        self.hide_cart_panel();
        Ok(())
    }
}
