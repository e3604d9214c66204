//! Grouped "card" decoration pass over the flow layout.
//!
//! After the flow pass positions items, this pass derives one rounded
//! card rectangle behind each visible section and assigns corner masks
//! so only the run's outermost items round toward the card's edge.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use cardstock_core::geometry::{Color, CornerMask, EdgeInsets, Point, Rect, Size};
use tracing::trace;

use crate::model::ItemIndex;

use super::attributes::{
    DecorationAttributes, ItemAttributes, LayoutElement, SupplementaryAttributes,
};
use super::flow::{Axis, FlowLayout, FlowSource};

/// Per-section styling for group decorations.
///
/// Every method has a pass-through default, so an all-default style
/// produces invisible cards with square corners.
pub trait GroupStyle: Send + Sync {
    /// Corner radius for the card and for the run's outermost items.
    fn corner_radius(&self, _section: usize) -> f32 {
        0.0
    }

    /// Card fill. `None` draws no background.
    fn background(&self, _section: usize) -> Option<Color> {
        None
    }

    fn border_width(&self, _section: usize) -> f32 {
        0.0
    }

    fn border_color(&self, _section: usize) -> Option<Color> {
        None
    }

    /// Extra insets the inset-grouped appearance applies to the card
    /// rect. Negative values bleed outward past the item run.
    fn extra_insets(&self, _section: usize) -> EdgeInsets {
        EdgeInsets::ZERO
    }

    /// Whether the section gets a card at all.
    fn is_visible(&self, _section: usize) -> bool {
        true
    }
}

/// The all-default style.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGroupStyle;

impl GroupStyle for DefaultGroupStyle {}

/// How the card rect relates to the section's item run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupAppearance {
    /// The card spans the container minus the section's flow inset.
    #[default]
    Grouped,
    /// Like `Grouped`, then adjusted by the style's extra insets; the
    /// content size stretches to cover any decoration overflow.
    InsetGrouped,
}

/// Flow layout with one card decoration per visible section.
///
/// # Example
///
/// ```ignore
/// let mut layout = GroupedFlowLayout::new(Axis::Vertical);
/// layout.set_container_size(Size::new(375.0, 812.0));
/// layout.set_style(Arc::new(CardStyle { radius: 10.0 }));
/// layout.prepare(&source);
///
/// let card = layout.decoration(0).unwrap();
/// ```
pub struct GroupedFlowLayout {
    flow: FlowLayout,
    appearance: GroupAppearance,
    style: Arc<dyn GroupStyle>,
    decorations: BTreeMap<usize, DecorationAttributes>,
    grouped_content_size: Size,
}

impl GroupedFlowLayout {
    /// Creates a grouped layout with the default appearance.
    pub fn new(axis: Axis) -> Self {
        Self::with_appearance(axis, GroupAppearance::default())
    }

    /// Creates a grouped layout with an explicit appearance.
    pub fn with_appearance(axis: Axis, appearance: GroupAppearance) -> Self {
        Self {
            flow: FlowLayout::new(axis),
            appearance,
            style: Arc::new(DefaultGroupStyle),
            decorations: BTreeMap::new(),
            grouped_content_size: Size::ZERO,
        }
    }

    pub fn appearance(&self) -> GroupAppearance {
        self.appearance
    }

    /// Switches the appearance, invalidating the cached pass.
    pub fn set_appearance(&mut self, appearance: GroupAppearance) {
        if self.appearance != appearance {
            self.appearance = appearance;
            self.flow.invalidate();
        }
    }

    /// Replaces the style callbacks, invalidating the cached pass.
    pub fn set_style(&mut self, style: Arc<dyn GroupStyle>) {
        self.style = style;
        self.flow.invalidate();
    }

    /// The wrapped flow layout.
    pub fn flow(&self) -> &FlowLayout {
        &self.flow
    }

    /// Mutable access to the wrapped flow layout for configuration.
    pub fn flow_mut(&mut self) -> &mut FlowLayout {
        &mut self.flow
    }

    pub fn axis(&self) -> Axis {
        self.flow.axis()
    }

    pub fn container_size(&self) -> Size {
        self.flow.container_size()
    }

    pub fn set_container_size(&mut self, size: Size) {
        self.flow.set_container_size(size);
    }

    /// Marks the cached pass stale.
    pub fn invalidate(&mut self) {
        self.flow.invalidate();
    }

    /// Whether `prepare` must run before the next query.
    pub fn needs_prepare(&self) -> bool {
        self.flow.needs_prepare()
    }

    /// Runs the flow pass, then rebuilds every decoration and corner
    /// mask from scratch. Stale decorations never survive a pass.
    pub fn prepare(&mut self, source: &dyn FlowSource) {
        self.flow.prepare(source);
        self.decorations.clear();

        let container = self.flow.container_size();
        let section_count = source.section_count();
        for section in 0..section_count {
            if !self.style.is_visible(section) {
                continue;
            }
            let count = source.item_count(section);
            if count == 0 {
                continue;
            }
            let Some(first) = self
                .flow
                .item_attributes(ItemIndex::new(section, 0))
                .map(|attributes| attributes.frame)
            else {
                continue;
            };
            let Some(last) = self
                .flow
                .item_attributes(ItemIndex::new(section, count - 1))
                .map(|attributes| attributes.frame)
            else {
                continue;
            };
            let run = first.union(&last);
            if run.is_empty() {
                continue;
            }

            let inset = source.section_inset(section);
            let extra = match self.appearance {
                GroupAppearance::Grouped => EdgeInsets::ZERO,
                GroupAppearance::InsetGrouped => self.style.extra_insets(section),
            };

            let frame = match self.flow.axis() {
                Axis::Vertical => Rect::new(
                    inset.left + extra.left,
                    run.top() + extra.top,
                    container.width - inset.horizontal() - extra.horizontal(),
                    run.height() - extra.vertical(),
                ),
                Axis::Horizontal => Rect::new(
                    run.left() + extra.left,
                    inset.top + extra.top,
                    run.width() - extra.horizontal(),
                    container.height - inset.vertical() - extra.vertical(),
                ),
            };

            let mut decoration = DecorationAttributes::new(section);
            decoration.frame = frame;
            decoration.background = self.style.background(section);
            decoration.corner_radius = self.style.corner_radius(section);
            decoration.border_width = self.style.border_width(section);
            decoration.border_color = self.style.border_color(section);
            self.decorations.insert(section, decoration);

            self.assign_corner_masks(section, count);
        }

        self.grouped_content_size = self.resolve_content_size();
        trace!(
            target: "cardstock::layout",
            decorations = self.decorations.len(),
            "group pass complete"
        );
    }

    /// Rounds the run's outermost items toward the card's edge and
    /// squares everything between them.
    fn assign_corner_masks(&mut self, section: usize, count: usize) {
        let radius = self.style.corner_radius(section);
        let axis = self.flow.axis();

        if count == 1 {
            if let Some(attributes) = self.flow.item_attributes_mut(ItemIndex::new(section, 0)) {
                attributes.corner_radius = radius;
                attributes.masked_corners = CornerMask::ALL;
            }
            return;
        }

        if let Some(attributes) = self.flow.item_attributes_mut(ItemIndex::new(section, 0)) {
            attributes.corner_radius = radius;
            attributes.masked_corners = match axis {
                Axis::Vertical => CornerMask::TOP,
                Axis::Horizontal => CornerMask::LEFT,
            };
        }
        for item in 1..count - 1 {
            if let Some(attributes) = self.flow.item_attributes_mut(ItemIndex::new(section, item))
            {
                attributes.masked_corners = CornerMask::NONE;
            }
        }
        if let Some(attributes) = self
            .flow
            .item_attributes_mut(ItemIndex::new(section, count - 1))
        {
            attributes.corner_radius = radius;
            attributes.masked_corners = match axis {
                Axis::Vertical => CornerMask::BOTTOM,
                Axis::Horizontal => CornerMask::RIGHT,
            };
        }
    }

    /// Flow content size, stretched under the inset-grouped appearance
    /// to cover decorations that bleed past it.
    fn resolve_content_size(&self) -> Size {
        let flow_size = self.flow.content_size();
        if self.appearance == GroupAppearance::Grouped || self.decorations.is_empty() {
            return flow_size;
        }
        let mut bounds = Rect::new(0.0, 0.0, flow_size.width, flow_size.height);
        for decoration in self.decorations.values() {
            bounds = bounds.union(&decoration.frame);
        }
        Size::new(bounds.right(), bounds.bottom())
    }

    /// Total extent of the laid-out content, decorations included.
    pub fn content_size(&self) -> Size {
        self.grouped_content_size
    }

    /// The card decoration for a section, if this pass produced one.
    pub fn decoration(&self, section: usize) -> Option<&DecorationAttributes> {
        self.decorations.get(&section)
    }

    /// All decorations of the cached pass, keyed by section.
    pub fn decorations(&self) -> &BTreeMap<usize, DecorationAttributes> {
        &self.decorations
    }

    /// Cached attributes for one item.
    pub fn item_attributes(&self, index: ItemIndex) -> Option<&ItemAttributes> {
        self.flow.item_attributes(index)
    }

    /// Cached attributes for a section's header.
    pub fn header_attributes(&self, section: usize) -> Option<&SupplementaryAttributes> {
        self.flow.header_attributes(section)
    }

    /// Cached attributes for a section's footer.
    pub fn footer_attributes(&self, section: usize) -> Option<&SupplementaryAttributes> {
        self.flow.footer_attributes(section)
    }

    /// Flow elements plus decorations intersecting `rect`.
    pub fn elements_in(&self, rect: Rect) -> Vec<LayoutElement> {
        let mut elements = self.flow.elements_in(rect);
        elements.extend(
            self.decorations
                .values()
                .filter(|decoration| decoration.frame.intersects(&rect))
                .cloned()
                .map(LayoutElement::Decoration),
        );
        elements
    }

    /// The first element containing `point`; items and supplementaries
    /// win over the card behind them.
    pub fn element_at(&self, point: Point) -> Option<LayoutElement> {
        self.flow.element_at(point).or_else(|| {
            self.decorations
                .values()
                .find(|decoration| decoration.frame.contains(point))
                .cloned()
                .map(LayoutElement::Decoration)
        })
    }

    /// Background-tap policy over every element, cards included.
    pub fn should_begin_background_tap(&self, point: Point) -> bool {
        if !self.flow.background_tap_enabled() {
            return false;
        }
        self.element_at(point).is_none()
    }
}

impl fmt::Debug for GroupedFlowLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedFlowLayout")
            .field("appearance", &self.appearance)
            .field("flow", &self.flow)
            .field("decorations", &self.decorations.len())
            .field("content_size", &self.grouped_content_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardstock_core::geometry::EdgeInsets;

    struct UniformSource {
        counts: Vec<usize>,
        item: Size,
        inset: EdgeInsets,
    }

    impl FlowSource for UniformSource {
        fn section_count(&self) -> usize {
            self.counts.len()
        }

        fn item_count(&self, section: usize) -> usize {
            self.counts[section]
        }

        fn item_size(&self, _index: ItemIndex) -> Size {
            self.item
        }

        fn section_inset(&self, _section: usize) -> EdgeInsets {
            self.inset
        }
    }

    struct CardStyle {
        radius: f32,
        extra: EdgeInsets,
    }

    impl GroupStyle for CardStyle {
        fn corner_radius(&self, _section: usize) -> f32 {
            self.radius
        }

        fn background(&self, _section: usize) -> Option<Color> {
            Some(Color::WHITE)
        }

        fn extra_insets(&self, _section: usize) -> EdgeInsets {
            self.extra
        }
    }

    #[test]
    fn test_group_layout_card_spans_item_run() {
        let mut layout = GroupedFlowLayout::new(Axis::Vertical);
        layout.set_container_size(Size::new(375.0, 812.0));
        layout.set_style(Arc::new(CardStyle {
            radius: 10.0,
            extra: EdgeInsets::ZERO,
        }));
        layout.prepare(&UniformSource {
            counts: vec![3],
            item: Size::new(343.0, 44.0),
            inset: EdgeInsets::new(8.0, 16.0, 8.0, 16.0),
        });

        let card = layout.decoration(0).unwrap();
        assert_eq!(card.frame, Rect::new(16.0, 8.0, 343.0, 132.0));
        assert_eq!(card.z_index, -1);
        assert_eq!(card.corner_radius, 10.0);
        assert_eq!(card.background, Some(Color::WHITE));
    }

    #[test]
    fn test_group_layout_corner_masks_by_run_position() {
        let mut layout = GroupedFlowLayout::new(Axis::Vertical);
        layout.set_container_size(Size::new(320.0, 600.0));
        layout.set_style(Arc::new(CardStyle {
            radius: 8.0,
            extra: EdgeInsets::ZERO,
        }));
        layout.prepare(&UniformSource {
            counts: vec![3],
            item: Size::new(320.0, 44.0),
            inset: EdgeInsets::ZERO,
        });

        let masks: Vec<CornerMask> = (0..3)
            .map(|item| {
                layout
                    .item_attributes(ItemIndex::new(0, item))
                    .unwrap()
                    .masked_corners
            })
            .collect();
        assert_eq!(masks, vec![CornerMask::TOP, CornerMask::NONE, CornerMask::BOTTOM]);
        assert_eq!(
            layout
                .item_attributes(ItemIndex::new(0, 0))
                .unwrap()
                .corner_radius,
            8.0
        );
    }

    #[test]
    fn test_group_layout_single_item_rounds_all_corners() {
        let mut layout = GroupedFlowLayout::new(Axis::Vertical);
        layout.set_container_size(Size::new(320.0, 600.0));
        layout.set_style(Arc::new(CardStyle {
            radius: 8.0,
            extra: EdgeInsets::ZERO,
        }));
        layout.prepare(&UniformSource {
            counts: vec![1],
            item: Size::new(320.0, 44.0),
            inset: EdgeInsets::ZERO,
        });

        assert_eq!(
            layout
                .item_attributes(ItemIndex::new(0, 0))
                .unwrap()
                .masked_corners,
            CornerMask::ALL
        );
    }

    #[test]
    fn test_group_layout_skips_empty_sections() {
        let mut layout = GroupedFlowLayout::new(Axis::Vertical);
        layout.set_container_size(Size::new(320.0, 600.0));
        layout.prepare(&UniformSource {
            counts: vec![0, 2],
            item: Size::new(320.0, 44.0),
            inset: EdgeInsets::ZERO,
        });

        assert!(layout.decoration(0).is_none());
        assert!(layout.decoration(1).is_some());
        assert_eq!(layout.decorations().len(), 1);
    }

    #[test]
    fn test_group_layout_inset_grouped_extra_insets() {
        let mut layout =
            GroupedFlowLayout::with_appearance(Axis::Vertical, GroupAppearance::InsetGrouped);
        layout.set_container_size(Size::new(375.0, 812.0));
        layout.set_style(Arc::new(CardStyle {
            radius: 10.0,
            extra: EdgeInsets::new(4.0, 12.0, 4.0, 12.0),
        }));
        layout.prepare(&UniformSource {
            counts: vec![2],
            item: Size::new(343.0, 50.0),
            inset: EdgeInsets::new(0.0, 16.0, 0.0, 16.0),
        });

        let card = layout.decoration(0).unwrap();
        assert_eq!(card.frame, Rect::new(28.0, 4.0, 319.0, 92.0));
    }

    #[test]
    fn test_group_layout_grouped_appearance_ignores_extra_insets() {
        let mut layout = GroupedFlowLayout::new(Axis::Vertical);
        layout.set_container_size(Size::new(375.0, 812.0));
        layout.set_style(Arc::new(CardStyle {
            radius: 10.0,
            extra: EdgeInsets::uniform(12.0),
        }));
        layout.prepare(&UniformSource {
            counts: vec![1],
            item: Size::new(343.0, 50.0),
            inset: EdgeInsets::new(0.0, 16.0, 0.0, 16.0),
        });

        let card = layout.decoration(0).unwrap();
        assert_eq!(card.frame, Rect::new(16.0, 0.0, 343.0, 50.0));
    }
}
