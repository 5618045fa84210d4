//! The visual surface contract.

use comfy_house_core::{ControlId, ProductId};

/// Class marking the remove control of a cart line.
pub const REMOVE_MARKER: &str = "remove-item";
/// Class marking the increment control of a cart line.
pub const INCREMENT_MARKER: &str = "fa-chevron-up";
/// Class marking the decrement control of a cart line.
pub const DECREMENT_MARKER: &str = "fa-chevron-down";

/// Named regions of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// Grid of product cards.
    CatalogGrid,
    /// Slide-in cart panel.
    CartPanel,
    /// Backdrop behind the cart panel.
    CartOverlay,
    /// Money total display.
    CartTotal,
    /// Item count badge.
    CartItemCount,
    /// Container of cart line fragments.
    CartContent,
}

impl Region {
    /// CSS class identifying the region in markup.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::CatalogGrid => "products-center",
            Self::CartPanel => "cart",
            Self::CartOverlay => "cart-overlay",
            Self::CartTotal => "cart-total",
            Self::CartItemCount => "cart-items",
            Self::CartContent => "cart-content",
        }
    }
}

/// Presentation state of a product's add control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub label: &'static str,
}

impl ControlState {
    /// Enabled, offering to add the product.
    #[must_use]
    pub const fn available() -> Self {
        Self {
            enabled: true,
            label: "add to bag",
        }
    }

    /// Disabled because the product already has a cart line.
    #[must_use]
    pub const fn in_cart() -> Self {
        Self {
            enabled: false,
            label: "In Cart",
        }
    }
}

/// The element a click inside the cart panel landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTarget {
    /// Space-separated class list of the element.
    pub class_name: String,
    /// The element's `data-id`, if any.
    pub data_id: Option<ProductId>,
}

impl ClickTarget {
    #[must_use]
    pub fn new(class_name: impl Into<String>, data_id: Option<ProductId>) -> Self {
        Self {
            class_name: class_name.into(),
            data_id,
        }
    }

    /// Whether the element carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }
}

/// A cart-panel click resolved to a cart operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    Remove(ProductId),
    Increment(ProductId),
    Decrement(ProductId),
}

impl CartAction {
    /// Classify a click by its marker class. Unmarked targets, and targets
    /// without a `data-id`, yield `None`.
    #[must_use]
    pub fn from_target(target: &ClickTarget) -> Option<Self> {
        let id = target.data_id.clone()?;
        if target.has_class(REMOVE_MARKER) {
            Some(Self::Remove(id))
        } else if target.has_class(INCREMENT_MARKER) {
            Some(Self::Increment(id))
        } else if target.has_class(DECREMENT_MARKER) {
            Some(Self::Decrement(id))
        } else {
            None
        }
    }
}

/// A tree of visual elements the widget writes into.
///
/// Implementations decide how markup is displayed; the binder only relies on
/// the operations below.
pub trait Surface {
    /// Replace the markup of a region.
    fn replace_region(&mut self, region: Region, html: String);

    /// Replace the text content of a region.
    fn set_text(&mut self, region: Region, text: &str);

    /// Append a cart line fragment to the cart content, tagged with `id`.
    fn append_line(&mut self, id: &ProductId, html: String);

    /// Update the amount text of the line fragment tagged with `id`.
    fn set_line_amount(&mut self, id: &ProductId, amount: u32);

    /// Remove the line fragment tagged with `id`.
    fn remove_line(&mut self, id: &ProductId);

    /// Mount the add control of the card for `id`, returning its handle.
    fn mount_add_control(&mut self, id: &ProductId) -> ControlId;

    /// Update an add control.
    fn set_control(&mut self, control: &ControlId, state: ControlState);

    fn add_class(&mut self, region: Region, class: &str);

    fn remove_class(&mut self, region: Region, class: &str);
}
