use crate::{Footer, Node};

/// Opaque handle for a live element owned by a [`RenderSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Geometry of the scroll container, in px.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    /// Current scroll offset (`scrollTop`).
    pub top: u64,
    /// Full content extent (`scrollHeight`).
    pub height: u64,
    /// Visible extent (`clientHeight`).
    pub viewport: u64,
}

impl ScrollMetrics {
    /// Distance between the bottom of the viewport and the end of the content.
    pub fn remaining(&self) -> u64 {
        self.height
            .saturating_sub(self.top.saturating_add(self.viewport))
    }
}

/// An item ready to be mounted: the caller's node, tagged with its absolute index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedItem {
    pub index: usize,
    pub node: Node,
    /// Whether the surface should route clicks on this element to
    /// [`crate::ListController::on_item_click`].
    pub clickable: bool,
    /// Whether this element takes part in visibility accounting.
    pub trackable: bool,
}

/// The drawable side of a list.
///
/// The controller is the only caller and always calls it last in a data-changing operation.
/// Every method is synchronous: when `set_footer` returns, the footer (and its sentinel, if
/// any) exists.
pub trait RenderSurface: Send {
    /// Mounts a batch of items at the end of the list in a single mutation and returns their
    /// element handles in the same order.
    fn append_items(&mut self, items: Vec<RenderedItem>) -> Vec<ElementId>;

    /// Removes every item, the footer and any transient status element.
    fn clear(&mut self);

    /// Shows `indicator` as the loading indicator, or removes it when `None`.
    fn set_loading(&mut self, indicator: Option<&Node>);

    /// Replaces the footer. Returns the load-more sentinel when `footer` is
    /// [`Footer::LoadMore`].
    fn set_footer(&mut self, footer: &Footer) -> Option<ElementId>;

    fn scroll_metrics(&self) -> ScrollMetrics;

    fn set_scroll_top(&mut self, top: u64);

    /// Mounts a search input. Only called when search is enabled.
    fn mount_search(&mut self, _placeholder: &str) {}
}
