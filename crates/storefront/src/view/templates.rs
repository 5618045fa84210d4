//! Askama templates and the view models they render.
//!
//! Markup is escaped by askama; the page template only marks fragments that
//! were themselves produced by these templates as `safe`.

use askama::Template;
use comfy_house_core::{CartLine, Product};

use super::surface::ControlState;

/// Product card display data.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub image: String,
    pub state: ControlState,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, state: ControlState) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
            state,
        }
    }
}

/// Cart line display data.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub image: String,
    pub amount: u32,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product.id.to_string(),
            title: line.product.title.clone(),
            price: line.product.price.to_string(),
            image: line.product.image.clone(),
            amount: line.amount,
        }
    }
}

/// Catalog grid fragment.
#[derive(Template)]
#[template(path = "partials/product_cards.html")]
pub struct ProductCardsTemplate {
    pub cards: Vec<ProductCardView>,
}

/// Single cart line fragment.
#[derive(Template)]
#[template(path = "partials/cart_line.html")]
pub struct CartLineTemplate {
    pub line: CartLineView,
}

/// Whole page, assembled from region contents.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub catalog: String,
    pub cart_content: String,
    pub total: String,
    pub item_count: String,
    pub cart_class: String,
    pub overlay_class: String,
}
