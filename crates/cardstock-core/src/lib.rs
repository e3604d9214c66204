//! Foundation types for Cardstock.
//!
//! This crate provides the host-independent pieces of the Cardstock
//! data-binding layer:
//!
//! - **Geometry**: points, sizes, rectangles, edge insets, corner masks,
//!   and colors used by the layout engine
//! - **Thread checks**: affinity tracking for objects that must stay on
//!   the host's UI thread
//! - **Debounce**: the restartable deadline used to coalesce bursts of
//!   update requests
//!
//! # Example
//!
//! ```
//! use cardstock_core::geometry::{EdgeInsets, Rect};
//!
//! let bounds = Rect::new(0.0, 0.0, 320.0, 480.0);
//! let content = bounds.inset_by(EdgeInsets::new(8.0, 16.0, 8.0, 16.0));
//! assert_eq!(content.width(), 288.0);
//! ```

pub mod debounce;
pub mod geometry;
pub mod thread_check;

pub use debounce::Debouncer;
pub use geometry::{Color, CornerMask, EdgeInsets, Point, Rect, Size};
pub use thread_check::ThreadAffinity;
