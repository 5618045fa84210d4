//! In-memory HTML surface.
//!
//! Keeps the markup of each region, the ordered cart line fragments, the
//! state of every mounted add control and the presentation classes, and can
//! assemble them into a full page with [`HtmlSurface::document`].

use std::collections::{BTreeSet, HashMap};

use askama::Template;
use comfy_house_core::{ControlId, ProductId};

use super::surface::{ControlState, Region, Surface};
use super::templates::PageTemplate;

/// Marker of the element holding a line's amount text.
const AMOUNT_MARKER: &str = "class=\"item-amount\">";

/// An add control mounted on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedControl {
    pub product_id: ProductId,
    pub state: ControlState,
}

#[derive(Debug, Clone)]
struct LineFragment {
    id: ProductId,
    html: String,
}

/// Surface that records everything written to it.
#[derive(Debug, Default)]
pub struct HtmlSurface {
    markup: HashMap<Region, String>,
    text: HashMap<Region, String>,
    classes: HashMap<Region, BTreeSet<String>>,
    lines: Vec<LineFragment>,
    controls: HashMap<ControlId, MountedControl>,
    next_control: usize,
}

impl HtmlSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup last written to `region`.
    #[must_use]
    pub fn markup(&self, region: Region) -> Option<&str> {
        self.markup.get(&region).map(String::as_str)
    }

    /// Text last written to `region`.
    #[must_use]
    pub fn text(&self, region: Region) -> Option<&str> {
        self.text.get(&region).map(String::as_str)
    }

    #[must_use]
    pub fn has_class(&self, region: Region, class: &str) -> bool {
        self.classes
            .get(&region)
            .is_some_and(|classes| classes.contains(class))
    }

    /// Ids of the rendered cart lines, in display order.
    #[must_use]
    pub fn line_ids(&self) -> Vec<&ProductId> {
        self.lines.iter().map(|line| &line.id).collect()
    }

    /// Markup of the line fragment tagged with `id`.
    #[must_use]
    pub fn line_html(&self, id: &ProductId) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| &line.id == id)
            .map(|line| line.html.as_str())
    }

    /// Current amount text of the line tagged with `id`.
    #[must_use]
    pub fn line_amount(&self, id: &ProductId) -> Option<&str> {
        let html = self.line_html(id)?;
        let start = html.find(AMOUNT_MARKER)? + AMOUNT_MARKER.len();
        let rest = html.get(start..)?;
        let end = rest.find('<')?;
        rest.get(..end)
    }

    #[must_use]
    pub fn control(&self, control: &ControlId) -> Option<&MountedControl> {
        self.controls.get(control)
    }

    /// The mounted add control for `id`, if any.
    #[must_use]
    pub fn control_for(&self, id: &ProductId) -> Option<&MountedControl> {
        self.controls
            .values()
            .find(|control| &control.product_id == id)
    }

    /// Number of mounted add controls.
    #[must_use]
    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    fn class_list(&self, region: Region) -> String {
        let mut list = vec![region.class_name()];
        if let Some(extra) = self.classes.get(&region) {
            list.extend(extra.iter().map(String::as_str));
        }
        list.join(" ")
    }

    /// Render the whole page from the current surface state.
    ///
    /// # Errors
    ///
    /// Returns `askama::Error` if the page template fails to render.
    pub fn document(&self) -> askama::Result<String> {
        PageTemplate {
            catalog: self.markup(Region::CatalogGrid).unwrap_or_default().to_string(),
            cart_content: self
                .lines
                .iter()
                .map(|line| line.html.as_str())
                .collect::<String>(),
            total: self.text(Region::CartTotal).unwrap_or("$0.00").to_string(),
            item_count: self.text(Region::CartItemCount).unwrap_or("0").to_string(),
            cart_class: self.class_list(Region::CartPanel),
            overlay_class: self.class_list(Region::CartOverlay),
        }
        .render()
    }
}

/// Replace the text between the amount marker and the next tag.
fn replace_amount(html: &str, amount: u32) -> Option<String> {
    let start = html.find(AMOUNT_MARKER)? + AMOUNT_MARKER.len();
    let end = start + html.get(start..)?.find('<')?;
    Some(format!(
        "{}{amount}{}",
        html.get(..start)?,
        html.get(end..)?
    ))
}

impl Surface for HtmlSurface {
    fn replace_region(&mut self, region: Region, html: String) {
        if region == Region::CatalogGrid {
            // Controls belong to the cards being replaced
            self.controls.clear();
        }
        self.markup.insert(region, html);
    }

    fn set_text(&mut self, region: Region, text: &str) {
        self.text.insert(region, text.to_string());
    }

    fn append_line(&mut self, id: &ProductId, html: String) {
        self.lines.push(LineFragment {
            id: id.clone(),
            html,
        });
    }

    fn set_line_amount(&mut self, id: &ProductId, amount: u32) {
        if let Some(line) = self.lines.iter_mut().find(|line| &line.id == id)
            && let Some(html) = replace_amount(&line.html, amount)
        {
            line.html = html;
        }
    }

    fn remove_line(&mut self, id: &ProductId) {
        self.lines.retain(|line| &line.id != id);
    }

    fn mount_add_control(&mut self, id: &ProductId) -> ControlId {
        let control = ControlId::new(format!("control-{}", self.next_control));
        self.next_control += 1;
        self.controls.insert(
            control.clone(),
            MountedControl {
                product_id: id.clone(),
                state: ControlState::available(),
            },
        );
        control
    }

    fn set_control(&mut self, control: &ControlId, state: ControlState) {
        if let Some(mounted) = self.controls.get_mut(control) {
            mounted.state = state;
        }
    }

    fn add_class(&mut self, region: Region, class: &str) {
        self.classes
            .entry(region)
            .or_default()
            .insert(class.to_string());
    }

    fn remove_class(&mut self, region: Region, class: &str) {
        if let Some(classes) = self.classes.get_mut(&region) {
            classes.remove(class);
        }
    }
}
