//! Cardstock - a declarative data-binding layer for grid and list
//! surfaces.
//!
//! Applications describe their content as plain descriptor values and
//! never talk to the host widget directly:
//!
//! - **Descriptors**: [`Section`], [`Item`], and [`HeaderFooter`]
//!   values describing what to show, owned behind `Arc`
//! - **Row conveniences**: [`RowItem`] and [`RowHeaderFooter`], rows
//!   that track the container width and measure their own height
//! - **Layout**: [`FlowLayout`] line-flow geometry plus
//!   [`GroupedFlowLayout`], which decorates each section with a card
//!   behind its item run
//! - **Binding**: [`GridBinder`] answers a [`GridHost`]'s queries and
//!   applies debounced refreshes collected by the [`Reconciler`]
//!
//! # Layout Example
//!
//! ```
//! use cardstock::{Axis, FlowLayout, FlowSource, ItemIndex, Size};
//!
//! struct Rows;
//!
//! impl FlowSource for Rows {
//!     fn section_count(&self) -> usize {
//!         1
//!     }
//!
//!     fn item_count(&self, _section: usize) -> usize {
//!         3
//!     }
//!
//!     fn item_size(&self, _index: ItemIndex) -> Size {
//!         Size::new(320.0, 44.0)
//!     }
//! }
//!
//! let mut layout = FlowLayout::new(Axis::Vertical);
//! layout.set_container_size(Size::new(320.0, 568.0));
//! layout.prepare(&Rows);
//!
//! assert_eq!(layout.content_size(), Size::new(320.0, 132.0));
//! ```
//!
//! # Binding Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Instant;
//! use cardstock::{GridBinder, ItemDescriptor, RowItem, Section};
//!
//! let rows: Vec<Arc<dyn ItemDescriptor>> = names
//!     .iter()
//!     .map(|name| {
//!         Arc::new(
//!             RowItem::new::<LabelCell>()
//!                 .with_height(44.0)
//!                 .with_data(name.clone()),
//!         ) as Arc<dyn ItemDescriptor>
//!     })
//!     .collect();
//!
//! let mut binder = GridBinder::new();
//! binder.set_sections(&mut grid, vec![Arc::new(Section::with_items(rows))]);
//!
//! // Host callbacks route through the binder; each control tick
//! // applies whatever refreshes settled.
//! binder.flush_updates(&mut grid, Instant::now());
//! ```

pub mod bind;
pub mod error;
pub mod layout;
pub mod model;
pub mod reconcile;
pub mod view;

pub use bind::{BinderSource, GridBinder, GridHost, HostId, ScrollObserver};
pub use error::{BindError, BindResult};
pub use layout::{
    Axis, DecorationAttributes, DefaultGroupStyle, FlowLayout, FlowSource, GroupAppearance,
    GroupStyle, GroupedFlowLayout, ItemAttributes, LayoutElement, SupplementaryAttributes,
    SupplementarySlot,
};
pub use model::{
    AUTOMATIC_HEIGHT, AUTOMATIC_WIDTH, ContentLayout, HeaderFooter, HeaderFooterCallback,
    HeaderFooterDescriptor, Item, ItemCallback, ItemDescriptor, ItemIndex, ItemLayout, ReloadHook,
    ReloadKind, RowHeaderFooter, RowItem, RowMeasure, Section, SectionDescriptor,
};
pub use reconcile::{DEFAULT_DEBOUNCE, Reconciler, UpdateBatch};
pub use view::{CellFactory, CellView, HeaderFooterFactory, HeaderFooterView};

// Re-export the core geometry types used throughout the public API.
pub use cardstock_core::geometry::{Color, CornerMask, EdgeInsets, Point, Rect, Size};
