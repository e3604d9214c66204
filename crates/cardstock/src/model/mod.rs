//! Content descriptors: sections of items with optional headers and
//! footers.
//!
//! Descriptors are plain data owned by the application. The binder
//! holds them behind `Arc` and routes refreshes by reference identity,
//! so nothing a caller mutates shows on screen until the matching
//! descriptor's `reload` runs.

mod header_footer;
mod index;
mod item;
mod row;
mod section;

pub use header_footer::{HeaderFooter, HeaderFooterCallback, HeaderFooterDescriptor};
pub use index::ItemIndex;
pub use item::{Item, ItemCallback, ItemDescriptor};
pub use row::{ContentLayout, ItemLayout, RowHeaderFooter, RowItem, RowMeasure};
pub use section::{Section, SectionDescriptor};

use std::sync::Arc;

/// Sentinel width meaning "derive from the container at query time".
pub const AUTOMATIC_WIDTH: f32 = -1.0;

/// Sentinel height meaning "derive from the container at query time".
pub const AUTOMATIC_HEIGHT: f32 = -1.0;

/// How much of the surface a refresh request touches.
///
/// Variants order from lightest to heaviest; when two requests for the
/// same element coalesce, the heavier kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReloadKind {
    /// Repaint the visible element in place without touching layout.
    Rerender,
    /// Reload the element structurally, re-querying its size.
    Reload,
    /// Reload the whole surface.
    ReloadAll,
}

/// Callback installed into a descriptor's reload slot.
///
/// The binder wires one of these into every descriptor it manages;
/// calling [`reload`](ItemDescriptor::reload) on the descriptor routes
/// the request through it.
pub type ReloadHook = Arc<dyn Fn(ReloadKind) + Send + Sync>;
