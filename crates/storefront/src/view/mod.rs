//! Rendering and interaction.
//!
//! - [`Surface`] - the visual surface contract the widget writes into
//! - [`HtmlSurface`] - in-memory surface producing a full HTML document
//! - [`ViewBinder`] - renders cart/catalog state and routes UI events to the
//!   cart store
//! - [`templates`] - askama templates for cards, cart lines and the page

mod binder;
mod html;
mod surface;
pub mod templates;

pub use binder::{UiEvent, ViewBinder};
pub use html::{HtmlSurface, MountedControl};
pub use surface::{
    CartAction, ClickTarget, ControlState, DECREMENT_MARKER, INCREMENT_MARKER, REMOVE_MARKER, Region,
    Surface,
};
