//! View-side traits implemented by the host surface's pooled elements.
//!
//! This crate never creates or owns views; the host does. These traits
//! are the seam through which the binder paints pooled elements from
//! their descriptors.

use std::any::Any;
use std::sync::Arc;

use crate::model::{HeaderFooterDescriptor, ItemDescriptor};

/// A recyclable cell managed by the host surface.
///
/// The binder calls [`render`](CellView::render) every time a cell is
/// acquired for an item, and again for in-place repaints requested via
/// [`ReloadKind::Rerender`](crate::model::ReloadKind::Rerender).
pub trait CellView {
    /// Paints the cell from the item's current state.
    fn render(&mut self, _item: &Arc<dyn ItemDescriptor>) {}

    /// The cell is about to enter the visible region.
    fn will_display(&mut self) {}

    /// The cell has left the visible region.
    fn did_end_display(&mut self) {}

    /// Returns the concrete view for application-side downcasts.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A recyclable header or footer view managed by the host surface.
///
/// Unlike cells, these paint when they are about to display rather
/// than at acquisition, so the descriptor state they show is the state
/// at the moment they enter the visible region.
pub trait HeaderFooterView {
    /// Paints the view from the descriptor's current state.
    fn render(&mut self, _header_footer: &Arc<dyn HeaderFooterDescriptor>) {}

    /// Returns the concrete view for application-side downcasts.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Produces a fresh cell when the host's reuse pool is empty.
pub type CellFactory = Arc<dyn Fn() -> Box<dyn CellView> + Send + Sync>;

/// Produces a fresh header/footer view when the host's reuse pool is
/// empty.
pub type HeaderFooterFactory = Arc<dyn Fn() -> Box<dyn HeaderFooterView> + Send + Sync>;
