//! The host-surface seam: what a widget must provide to be driven.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use cardstock_core::geometry::{EdgeInsets, Point, Size};

use crate::model::ItemIndex;
use crate::view::{CellFactory, CellView, HeaderFooterFactory, HeaderFooterView};

/// Identity of a host instance, used to detect rebinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(u64);

static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(1);

impl HostId {
    /// Allocates a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The surface a [`GridBinder`](crate::bind::GridBinder) drives.
///
/// Implementations own the view pool and the screen; the binder only
/// issues commands and queries through this trait. Methods with
/// defaults are optional capabilities a minimal host can skip.
pub trait GridHost {
    /// Stable identity of this host instance.
    fn id(&self) -> HostId;

    /// Size of the scrollable viewport.
    fn container_size(&self) -> Size;

    /// Insets the host chrome applies around the content.
    fn content_inset(&self) -> EdgeInsets {
        EdgeInsets::ZERO
    }

    // -------------------------------------------------------------------------
    // View registration and the reuse pool
    // -------------------------------------------------------------------------

    fn register_cell(&mut self, reuse_id: &str, factory: CellFactory);

    fn register_header(&mut self, reuse_id: &str, factory: HeaderFooterFactory);

    fn register_footer(&mut self, reuse_id: &str, factory: HeaderFooterFactory);

    /// Dequeues (or creates) a cell for the position. `None` when the
    /// reuse identifier was never registered.
    fn acquire_cell(&mut self, reuse_id: &str, index: ItemIndex) -> Option<&mut dyn CellView>;

    /// Dequeues (or creates) a header view for the section.
    fn acquire_header(&mut self, reuse_id: &str, section: usize)
        -> Option<&mut dyn HeaderFooterView>;

    /// Dequeues (or creates) a footer view for the section.
    fn acquire_footer(&mut self, reuse_id: &str, section: usize)
        -> Option<&mut dyn HeaderFooterView>;

    /// The on-screen cell for a position, when visible.
    fn visible_cell(&mut self, index: ItemIndex) -> Option<&mut dyn CellView>;

    // -------------------------------------------------------------------------
    // Refresh commands
    // -------------------------------------------------------------------------

    /// Rebuilds the whole surface from the data source.
    fn reload_all(&mut self);

    /// Structurally reloads the given sections.
    fn reload_sections(&mut self, sections: &BTreeSet<usize>);

    /// Structurally reloads the given positions.
    fn reload_cells(&mut self, indices: &[ItemIndex]);

    /// Inserts elements at the given positions.
    fn insert_cells(&mut self, indices: &[ItemIndex]);

    /// Shows or hides the empty-content placeholder.
    fn set_placeholder_visible(&mut self, _visible: bool) {}
}

/// Verbatim scroll-event forwarding from the host surface.
///
/// Every method has a no-op default; applications override what they
/// need and hand the observer to the binder.
pub trait ScrollObserver: Send + Sync {
    /// The content offset changed.
    fn did_scroll(&self, _offset: Point) {}

    /// A drag is about to begin.
    fn will_begin_dragging(&self) {}

    /// The drag is ending; `target` is the proposed resting offset and
    /// may be rewritten to redirect deceleration.
    fn will_end_dragging(&self, _velocity: Point, _target: &mut Point) {}

    /// The drag ended. `decelerating` is `true` when coasting
    /// continues.
    fn did_end_dragging(&self, _decelerating: bool) {}

    fn will_begin_decelerating(&self) {}

    fn did_end_decelerating(&self) {}

    /// A programmatic scroll animation finished.
    fn did_end_scrolling_animation(&self) {}

    /// Whether a scroll-to-top gesture should proceed.
    fn should_scroll_to_top(&self) -> bool {
        true
    }

    /// A scroll-to-top gesture finished.
    fn did_scroll_to_top(&self) {}

    /// The host's effective content insets changed.
    fn did_change_content_inset(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_ids_are_unique() {
        let a = HostId::next();
        let b = HostId::next();
        assert_ne!(a, b);
    }
}
