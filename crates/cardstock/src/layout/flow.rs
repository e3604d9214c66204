//! Single-axis flow: the positioning primitive under the grouped
//! layouts.
//!
//! Items flow into lines along the cross axis and wrap when the next
//! item would overrun the container, so a vertical surface with
//! full-width items degenerates to a plain list while narrower items
//! form a grid. Headers and footers span the full cross extent; section
//! insets apply only around non-empty item runs.
//!
//! # Example
//!
//! ```ignore
//! let mut layout = FlowLayout::new(Axis::Vertical);
//! layout.set_container_size(Size::new(375.0, 812.0));
//! layout.prepare(&source);
//!
//! let visible = layout.elements_in(viewport);
//! let total = layout.content_size();
//! ```

use cardstock_core::geometry::{EdgeInsets, Point, Rect, Size};
use tracing::trace;

use crate::model::ItemIndex;

use super::attributes::{
    ItemAttributes, LayoutElement, SupplementaryAttributes, SupplementarySlot,
};

/// Scroll axis of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl Axis {
    /// Builds a rect from main-axis and cross-axis coordinates.
    fn frame(self, main: f32, cross: f32, main_extent: f32, cross_extent: f32) -> Rect {
        match self {
            Axis::Vertical => Rect::new(cross, main, cross_extent, main_extent),
            Axis::Horizontal => Rect::new(main, cross, main_extent, cross_extent),
        }
    }
}

/// What the flow pass needs to know about the content.
///
/// The binder implements this over its section list; tests and custom
/// drivers implement it directly. Sizes must arrive resolved: automatic
/// dimensions are the binder's business, not the layout's.
pub trait FlowSource {
    fn section_count(&self) -> usize;

    fn item_count(&self, section: usize) -> usize;

    /// Resolved size for one item.
    fn item_size(&self, index: ItemIndex) -> Size;

    /// Inset around the section's item run.
    fn section_inset(&self, _section: usize) -> EdgeInsets {
        EdgeInsets::ZERO
    }

    /// Spacing between lines along the scroll axis.
    fn line_spacing(&self, _section: usize) -> f32 {
        0.0
    }

    /// Spacing between items within a line.
    fn interitem_spacing(&self, _section: usize) -> f32 {
        0.0
    }

    /// Extent of the section's header along the scroll axis; zero means
    /// no header.
    fn header_extent(&self, _section: usize) -> f32 {
        0.0
    }

    /// Extent of the section's footer along the scroll axis; zero means
    /// no footer.
    fn footer_extent(&self, _section: usize) -> f32 {
        0.0
    }

    /// Overrides the separator rule for one item. `None` keeps the
    /// rule: only a section's last item hides its separator.
    fn separator_override(&self, _index: ItemIndex) -> Option<bool> {
        None
    }
}

/// Greedy single-axis flow layout.
///
/// `prepare` recomputes every attribute from the source; queries answer
/// from the cached pass. Geometry setters invalidate but never
/// recompute on their own.
#[derive(Debug, Clone)]
pub struct FlowLayout {
    axis: Axis,
    container_size: Size,
    item_attributes: Vec<Vec<ItemAttributes>>,
    header_attributes: Vec<Option<SupplementaryAttributes>>,
    footer_attributes: Vec<Option<SupplementaryAttributes>>,
    content_size: Size,
    dirty: bool,
    background_tap_enabled: bool,
}

impl FlowLayout {
    /// Creates an empty layout for the given axis.
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            container_size: Size::ZERO,
            item_attributes: Vec::new(),
            header_attributes: Vec::new(),
            footer_attributes: Vec::new(),
            content_size: Size::ZERO,
            dirty: true,
            background_tap_enabled: false,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Changes the scroll axis, invalidating the cached pass.
    pub fn set_axis(&mut self, axis: Axis) {
        if self.axis != axis {
            self.axis = axis;
            self.invalidate();
        }
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    /// Updates the container size, invalidating on a real change.
    pub fn set_container_size(&mut self, size: Size) {
        if (size.width - self.container_size.width).abs() > f32::EPSILON
            || (size.height - self.container_size.height).abs() > f32::EPSILON
        {
            self.container_size = size;
            self.invalidate();
        }
    }

    /// Whether the background-tap policy is active.
    pub fn background_tap_enabled(&self) -> bool {
        self.background_tap_enabled
    }

    /// Enables or disables the background-tap policy. Disabled by
    /// default: taps never begin until a host opts in.
    pub fn set_background_tap_enabled(&mut self, enabled: bool) {
        self.background_tap_enabled = enabled;
    }

    /// Marks the cached pass stale.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether `prepare` must run before the next query.
    pub fn needs_prepare(&self) -> bool {
        self.dirty
    }

    /// Total extent of the laid-out content.
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Number of sections in the cached pass.
    pub fn section_count(&self) -> usize {
        self.item_attributes.len()
    }

    /// Recomputes every frame from the source.
    pub fn prepare(&mut self, source: &dyn FlowSource) {
        let section_count = source.section_count();
        self.item_attributes.clear();
        self.header_attributes.clear();
        self.footer_attributes.clear();

        let container_cross = match self.axis {
            Axis::Vertical => self.container_size.width,
            Axis::Horizontal => self.container_size.height,
        };

        let mut main = 0.0f32;
        for section in 0..section_count {
            let header_extent = source.header_extent(section).max(0.0);
            if header_extent > 0.0 {
                let mut header = SupplementaryAttributes::new(section, SupplementarySlot::Header);
                header.frame = self.axis.frame(main, 0.0, header_extent, container_cross);
                self.header_attributes.push(Some(header));
                main += header_extent;
            } else {
                self.header_attributes.push(None);
            }

            let count = source.item_count(section);
            let mut attributes: Vec<ItemAttributes> = (0..count)
                .map(|item| ItemAttributes::new(ItemIndex::new(section, item)))
                .collect();

            if count > 0 {
                let inset = source.section_inset(section);
                let line_spacing = source.line_spacing(section);
                let interitem = source.interitem_spacing(section);
                let (main_leading, main_trailing, cross_leading, cross_trailing) = match self.axis
                {
                    Axis::Vertical => (inset.top, inset.bottom, inset.left, inset.right),
                    Axis::Horizontal => (inset.left, inset.right, inset.top, inset.bottom),
                };

                main += main_leading;
                let cross_start = cross_leading;
                let cross_limit = container_cross - cross_trailing;

                // (position in section, cross position, cross extent, main extent)
                let mut line: Vec<(usize, f32, f32, f32)> = Vec::new();
                let mut cross = cross_start;
                let mut line_extent = 0.0f32;

                for item in 0..count {
                    let size = source.item_size(ItemIndex::new(section, item));
                    let (item_main, item_cross) = match self.axis {
                        Axis::Vertical => (size.height.max(0.0), size.width.max(0.0)),
                        Axis::Horizontal => (size.width.max(0.0), size.height.max(0.0)),
                    };

                    // Wrap when the item cannot join the current line.
                    if !line.is_empty() && cross + interitem + item_cross > cross_limit {
                        Self::close_line(self.axis, &mut attributes, &line, main, line_extent);
                        main += line_extent + line_spacing;
                        line.clear();
                        cross = cross_start;
                        line_extent = 0.0;
                    }

                    let placed = if line.is_empty() {
                        cross_start
                    } else {
                        cross + interitem
                    };
                    line.push((item, placed, item_cross, item_main));
                    cross = placed + item_cross;
                    line_extent = line_extent.max(item_main);
                }

                if !line.is_empty() {
                    Self::close_line(self.axis, &mut attributes, &line, main, line_extent);
                    main += line_extent;
                }
                main += main_trailing;

                // A section's last item never draws a trailing separator.
                if let Some(last) = attributes.last_mut() {
                    last.separator_hidden = true;
                }
                // Items that manage their own separator override the rule.
                for item_attributes in attributes.iter_mut() {
                    if let Some(hidden) = source.separator_override(item_attributes.index) {
                        item_attributes.separator_hidden = hidden;
                    }
                }
            }
            self.item_attributes.push(attributes);

            let footer_extent = source.footer_extent(section).max(0.0);
            if footer_extent > 0.0 {
                let mut footer = SupplementaryAttributes::new(section, SupplementarySlot::Footer);
                footer.frame = self.axis.frame(main, 0.0, footer_extent, container_cross);
                self.footer_attributes.push(Some(footer));
                main += footer_extent;
            } else {
                self.footer_attributes.push(None);
            }
        }

        self.content_size = match self.axis {
            Axis::Vertical => Size::new(self.container_size.width, main),
            Axis::Horizontal => Size::new(main, self.container_size.height),
        };
        self.dirty = false;

        trace!(
            target: "cardstock::layout",
            sections = section_count,
            content_size = ?self.content_size,
            "flow pass complete"
        );
    }

    /// Positions a finished line, centering each item on the line's
    /// largest extent.
    fn close_line(
        axis: Axis,
        attributes: &mut [ItemAttributes],
        line: &[(usize, f32, f32, f32)],
        line_main: f32,
        line_extent: f32,
    ) {
        for &(position, cross, cross_extent, main_extent) in line {
            let main = line_main + (line_extent - main_extent) / 2.0;
            attributes[position].frame = axis.frame(main, cross, main_extent, cross_extent);
        }
    }

    /// Cached attributes for one item.
    pub fn item_attributes(&self, index: ItemIndex) -> Option<&ItemAttributes> {
        self.item_attributes.get(index.section)?.get(index.item)
    }

    pub(crate) fn item_attributes_mut(&mut self, index: ItemIndex) -> Option<&mut ItemAttributes> {
        self.item_attributes
            .get_mut(index.section)?
            .get_mut(index.item)
    }

    /// Cached attributes for a section's header.
    pub fn header_attributes(&self, section: usize) -> Option<&SupplementaryAttributes> {
        self.header_attributes.get(section)?.as_ref()
    }

    /// Cached attributes for a section's footer.
    pub fn footer_attributes(&self, section: usize) -> Option<&SupplementaryAttributes> {
        self.footer_attributes.get(section)?.as_ref()
    }

    /// Every element whose frame intersects `rect`, in section order.
    pub fn elements_in(&self, rect: Rect) -> Vec<LayoutElement> {
        let mut elements = Vec::new();
        for (section, attributes) in self.item_attributes.iter().enumerate() {
            if let Some(Some(header)) = self.header_attributes.get(section) {
                if header.frame.intersects(&rect) {
                    elements.push(LayoutElement::Supplementary(header.clone()));
                }
            }
            for item in attributes {
                if item.frame.intersects(&rect) {
                    elements.push(LayoutElement::Item(item.clone()));
                }
            }
            if let Some(Some(footer)) = self.footer_attributes.get(section) {
                if footer.frame.intersects(&rect) {
                    elements.push(LayoutElement::Supplementary(footer.clone()));
                }
            }
        }
        elements
    }

    /// The first element whose frame contains `point`.
    pub fn element_at(&self, point: Point) -> Option<LayoutElement> {
        for (section, attributes) in self.item_attributes.iter().enumerate() {
            if let Some(Some(header)) = self.header_attributes.get(section) {
                if header.frame.contains(point) {
                    return Some(LayoutElement::Supplementary(header.clone()));
                }
            }
            for item in attributes {
                if item.frame.contains(point) {
                    return Some(LayoutElement::Item(item.clone()));
                }
            }
            if let Some(Some(footer)) = self.footer_attributes.get(section) {
                if footer.frame.contains(point) {
                    return Some(LayoutElement::Supplementary(footer.clone()));
                }
            }
        }
        None
    }

    /// Background-tap policy: a tap may begin only when the policy is
    /// enabled and the point lands on no element's frame.
    pub fn should_begin_background_tap(&self, point: Point) -> bool {
        if !self.background_tap_enabled {
            return false;
        }
        self.element_at(point).is_none()
    }
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self::new(Axis::Vertical)
    }
}

// =============================================================================
// Tests
// =============================================================================
