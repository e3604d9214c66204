//! Layout attribute records, the per-pass output of the engines.
//!
//! Attributes compare by value so hosts can diff a pass against the
//! previous one and repaint only what changed.

use std::fmt;

use cardstock_core::geometry::{Color, CornerMask, Rect};

use crate::model::ItemIndex;

/// Which supplementary slot of a section an attribute describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplementarySlot {
    Header,
    Footer,
}

impl fmt::Display for SupplementarySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Footer => f.write_str("footer"),
        }
    }
}

/// Per-item layout output: the frame plus the card styling the grouped
/// engines assign.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemAttributes {
    pub index: ItemIndex,
    pub frame: Rect,
    pub z_index: i32,
    /// `true` when the trailing separator should not be drawn. The flow
    /// pass sets this for each section's last item; items can override
    /// it through the source.
    pub separator_hidden: bool,
    pub corner_radius: f32,
    pub masked_corners: CornerMask,
}

impl ItemAttributes {
    /// Creates attributes for `index` with an empty frame and default
    /// styling: separator shown, square corners over a full mask.
    pub fn new(index: ItemIndex) -> Self {
        Self {
            index,
            frame: Rect::ZERO,
            z_index: 0,
            separator_hidden: false,
            corner_radius: 0.0,
            masked_corners: CornerMask::ALL,
        }
    }
}

/// Header or footer layout output.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplementaryAttributes {
    pub section: usize,
    pub slot: SupplementarySlot,
    pub frame: Rect,
    pub z_index: i32,
}

impl SupplementaryAttributes {
    pub fn new(section: usize, slot: SupplementarySlot) -> Self {
        Self {
            section,
            slot,
            frame: Rect::ZERO,
            z_index: 0,
        }
    }
}

/// Card decoration drawn behind a grouped section's items.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationAttributes {
    pub section: usize,
    pub frame: Rect,
    /// Decorations sit below item content.
    pub z_index: i32,
    /// Card fill; `None` draws nothing.
    pub background: Option<Color>,
    pub corner_radius: f32,
    pub border_width: f32,
    pub border_color: Option<Color>,
}

impl DecorationAttributes {
    pub fn new(section: usize) -> Self {
        Self {
            section,
            frame: Rect::ZERO,
            z_index: -1,
            background: None,
            corner_radius: 0.0,
            border_width: 0.0,
            border_color: None,
        }
    }
}

/// Any element the layout can answer region queries with.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutElement {
    Item(ItemAttributes),
    Supplementary(SupplementaryAttributes),
    Decoration(DecorationAttributes),
}

impl LayoutElement {
    /// The element's frame, regardless of kind.
    pub fn frame(&self) -> Rect {
        match self {
            Self::Item(attributes) => attributes.frame,
            Self::Supplementary(attributes) => attributes.frame,
            Self::Decoration(attributes) => attributes.frame,
        }
    }
}
