//! Self-sizing content for single-column lists.
//!
//! [`RowItem`] and [`RowHeaderFooter`] track the container geometry the
//! binder pushes into them and derive their own width from it, so a
//! vertical list only has to produce heights.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cardstock_core::geometry::{Color, EdgeInsets, Size};
use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use crate::view::{CellFactory, CellView, HeaderFooterFactory, HeaderFooterView};

use super::header_footer::{HeaderFooter, HeaderFooterCallback, HeaderFooterDescriptor};
use super::item::{Item, ItemCallback, ItemDescriptor};
use super::{ReloadHook, ReloadKind};

/// Layout capability for descriptors that track the container.
///
/// The binder's layout pass pushes the container size into every
/// capable descriptor and then calls
/// [`update_layout`](ContentLayout::update_layout). Setters only store;
/// nothing recomputes until that call.
pub trait ContentLayout: Send + Sync {
    /// Insets for the receiver's own subcontent, stored for measuring
    /// code. The width rule does not consume them.
    fn content_inset(&self) -> EdgeInsets;

    fn set_content_inset(&self, inset: EdgeInsets);

    /// Size of the hosting container, pushed by the binder.
    fn container_size(&self) -> Size;

    fn set_container_size(&self, size: Size);

    /// Recomputes the receiver's size from the stored geometry.
    fn update_layout(&self);
}

/// Layout capability for items; adds the section inset and the
/// separator policy.
pub trait ItemLayout: ContentLayout {
    /// Inset of the containing section, pushed by the binder.
    fn section_inset(&self) -> EdgeInsets;

    fn set_section_inset(&self, inset: EdgeInsets);

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// The item's own separator flag; `true` hides the trailing
    /// separator.
    fn separator_hidden(&self) -> bool {
        true
    }

    fn set_separator_hidden(&self, _hidden: bool) {}

    /// When `true` the item's own flag stops applying and the flow
    /// layout's last-item rule decides the separator attribute.
    fn ignores_separator_hidden(&self) -> bool {
        false
    }
}

/// Derives a row's height from its resolved width.
pub type RowMeasure = Arc<dyn Fn(f32) -> f32 + Send + Sync>;

/// Self-sizing item for vertical lists.
///
/// The width rule is `floor(container_width - section_inset.horizontal())`;
/// an optional measure closure then derives the height from that width.
///
/// # Example
///
/// ```ignore
/// let row = RowItem::new::<TextCell>()
///     .with_measure(|width| text.height_constrained_to(width))
///     .with_background(Color::WHITE);
/// ```
pub struct RowItem {
    base: Item,
    layout: Mutex<RowLayout>,
    measure: Option<RowMeasure>,
}

struct RowLayout {
    content_inset: EdgeInsets,
    container_size: Size,
    section_inset: EdgeInsets,
    separator_hidden: bool,
    ignores_separator_hidden: bool,
    background: Color,
}

impl RowLayout {
    fn new() -> Self {
        Self {
            content_inset: EdgeInsets::ZERO,
            container_size: Size::ZERO,
            section_inset: EdgeInsets::ZERO,
            separator_hidden: true,
            ignores_separator_hidden: false,
            background: Color::WHITE,
        }
    }
}

impl RowItem {
    /// Creates a row rendered by cells of type `V`.
    pub fn new<V: CellView + Default + 'static>() -> Self {
        Self {
            base: Item::new::<V>(),
            layout: Mutex::new(RowLayout::new()),
            measure: None,
        }
    }

    /// Creates a row with an explicit reuse identifier and factory.
    pub fn with_factory(reuse_id: impl Into<String>, factory: CellFactory) -> Self {
        Self {
            base: Item::with_factory(reuse_id, factory),
            layout: Mutex::new(RowLayout::new()),
            measure: None,
        }
    }

    /// Installs the measure closure. It receives the resolved row width
    /// and returns the row height.
    pub fn with_measure(mut self, measure: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        self.measure = Some(Arc::new(measure));
        self
    }

    /// Sets a fixed row height.
    pub fn with_height(self, height: f32) -> Self {
        self.set_height(height);
        self
    }

    /// Sets the background color the host should paint behind the row.
    pub fn with_background(self, color: Color) -> Self {
        self.set_background(color);
        self
    }

    /// Sets the item's own separator flag.
    pub fn with_separator_hidden(self, hidden: bool) -> Self {
        self.layout.lock().separator_hidden = hidden;
        self
    }

    /// Hands separator control to the flow layout's last-item rule.
    pub fn with_ignores_separator_hidden(self, ignores: bool) -> Self {
        self.layout.lock().ignores_separator_hidden = ignores;
        self
    }

    /// Sets insets for the row's own subcontent.
    pub fn with_content_inset(self, inset: EdgeInsets) -> Self {
        self.set_content_inset(inset);
        self
    }

    /// Installs the selection callback.
    pub fn with_on_select(
        self,
        callback: impl Fn(&Arc<dyn ItemDescriptor>) + Send + Sync + 'static,
    ) -> Self {
        self.base.set_on_select(Some(Arc::new(callback)));
        self
    }

    /// Attaches an application payload.
    pub fn with_data(self, data: Arc<dyn Any + Send + Sync>) -> Self {
        self.base.set_data(Some(data));
        self
    }

    /// Replaces the application payload.
    pub fn set_data(&self, data: Option<Arc<dyn Any + Send + Sync>>) {
        self.base.set_data(data);
    }

    /// Updates the row height, keeping the derived width.
    pub fn set_height(&self, height: f32) {
        let size = self.base.size();
        self.base.set_size(Size::new(size.width, height));
    }

    pub fn background(&self) -> Color {
        self.layout.lock().background
    }

    pub fn set_background(&self, color: Color) {
        self.layout.lock().background = color;
    }

    /// Re-measures, then refreshes with the lightest sufficient kind: a
    /// height change of at least half a point needs a structural
    /// reload, anything smaller only repaints in place.
    pub fn reload_auto(&self) {
        let before = self.base.size().height;
        self.update_layout();
        let after = self.base.size().height;
        let kind = if (after - before).abs() >= 0.5 {
            ReloadKind::Reload
        } else {
            ReloadKind::Rerender
        };
        self.base.reload(kind);
    }
}

impl ContentLayout for RowItem {
    fn content_inset(&self) -> EdgeInsets {
        self.layout.lock().content_inset
    }

    fn set_content_inset(&self, inset: EdgeInsets) {
        self.layout.lock().content_inset = inset;
    }

    fn container_size(&self) -> Size {
        self.layout.lock().container_size
    }

    fn set_container_size(&self, size: Size) {
        self.layout.lock().container_size = size;
    }

    fn update_layout(&self) {
        let (container, section_inset) = {
            let layout = self.layout.lock();
            (layout.container_size, layout.section_inset)
        };
        let width = (container.width - section_inset.horizontal()).floor();
        let mut size = self.base.size();
        size.width = width;
        if let Some(measure) = &self.measure {
            size.height = measure(width);
        }
        self.base.set_size(size);
    }
}

impl ItemLayout for RowItem {
    fn section_inset(&self) -> EdgeInsets {
        self.layout.lock().section_inset
    }

    fn set_section_inset(&self, inset: EdgeInsets) {
        self.layout.lock().section_inset = inset;
    }

    fn separator_hidden(&self) -> bool {
        self.layout.lock().separator_hidden
    }

    fn set_separator_hidden(&self, hidden: bool) {
        self.layout.lock().separator_hidden = hidden;
    }

    fn ignores_separator_hidden(&self) -> bool {
        self.layout.lock().ignores_separator_hidden
    }
}

impl ItemDescriptor for RowItem {
    fn size(&self) -> Size {
        self.base.size()
    }

    fn cell_factory(&self) -> CellFactory {
        self.base.cell_factory()
    }

    fn reuse_id(&self) -> String {
        self.base.reuse_id()
    }

    fn reload_hook(&self) -> Option<ReloadHook> {
        self.base.reload_hook()
    }

    fn set_reload_hook(&self, hook: Option<ReloadHook>) {
        self.base.set_reload_hook(hook);
    }

    fn should_select(&self) -> bool {
        self.base.should_select()
    }

    fn should_deselect(&self) -> bool {
        self.base.should_deselect()
    }

    fn should_highlight(&self) -> bool {
        self.base.should_highlight()
    }

    fn needs_update(&self) -> bool {
        self.base.needs_update()
    }

    fn set_needs_update(&self, needs_update: bool) {
        self.base.set_needs_update(needs_update);
    }

    fn data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.base.data()
    }

    fn on_select(&self) -> Option<ItemCallback> {
        self.base.on_select()
    }

    fn on_deselect(&self) -> Option<ItemCallback> {
        self.base.on_deselect()
    }

    fn on_will_display(&self) -> Option<ItemCallback> {
        self.base.on_will_display()
    }

    fn on_did_end_display(&self) -> Option<ItemCallback> {
        self.base.on_did_end_display()
    }

    fn as_item_layout(&self) -> Option<&dyn ItemLayout> {
        Some(self)
    }
}

impl fmt::Debug for RowItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = self.layout.lock();
        f.debug_struct("RowItem")
            .field("reuse_id", &self.base.reuse_id())
            .field("size", &self.base.size())
            .field("container_size", &layout.container_size)
            .field("section_inset", &layout.section_inset)
            .finish_non_exhaustive()
    }
}

/// Self-sizing header or footer for vertical lists.
///
/// The width tracks the container exactly; section insets do not apply
/// to supplementary slots.
pub struct RowHeaderFooter {
    base: HeaderFooter,
    layout: Mutex<RowSupplementaryLayout>,
    measure: Option<RowMeasure>,
}

struct RowSupplementaryLayout {
    content_inset: EdgeInsets,
    container_size: Size,
}

impl RowHeaderFooter {
    /// Creates a descriptor rendered by views of type `V`.
    pub fn new<V: HeaderFooterView + Default + 'static>() -> Self {
        Self {
            base: HeaderFooter::new::<V>(),
            layout: Mutex::new(RowSupplementaryLayout {
                content_inset: EdgeInsets::ZERO,
                container_size: Size::ZERO,
            }),
            measure: None,
        }
    }

    /// Creates a descriptor with an explicit reuse identifier and
    /// factory.
    pub fn with_factory(reuse_id: impl Into<String>, factory: HeaderFooterFactory) -> Self {
        Self {
            base: HeaderFooter::with_factory(reuse_id, factory),
            layout: Mutex::new(RowSupplementaryLayout {
                content_inset: EdgeInsets::ZERO,
                container_size: Size::ZERO,
            }),
            measure: None,
        }
    }

    /// Installs the measure closure. It receives the container width
    /// and returns the view height.
    pub fn with_measure(mut self, measure: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        self.measure = Some(Arc::new(measure));
        self
    }

    /// Sets a fixed height.
    pub fn with_height(self, height: f32) -> Self {
        let size = self.base.size();
        self.base.set_size(Size::new(size.width, height));
        self
    }
}

impl ContentLayout for RowHeaderFooter {
    fn content_inset(&self) -> EdgeInsets {
        self.layout.lock().content_inset
    }

    fn set_content_inset(&self, inset: EdgeInsets) {
        self.layout.lock().content_inset = inset;
    }

    fn container_size(&self) -> Size {
        self.layout.lock().container_size
    }

    fn set_container_size(&self, size: Size) {
        self.layout.lock().container_size = size;
    }

    fn update_layout(&self) {
        let container = self.layout.lock().container_size;
        let mut size = self.base.size();
        size.width = container.width;
        if let Some(measure) = &self.measure {
            size.height = measure(size.width);
        }
        self.base.set_size(size);
    }
}

impl HeaderFooterDescriptor for RowHeaderFooter {
    fn size(&self) -> Size {
        self.base.size()
    }

    fn view_factory(&self) -> HeaderFooterFactory {
        self.base.view_factory()
    }

    fn reuse_id(&self) -> String {
        self.base.reuse_id()
    }

    fn reload_hook(&self) -> Option<ReloadHook> {
        self.base.reload_hook()
    }

    fn set_reload_hook(&self, hook: Option<ReloadHook>) {
        self.base.set_reload_hook(hook);
    }

    fn needs_update(&self) -> bool {
        self.base.needs_update()
    }

    fn set_needs_update(&self, needs_update: bool) {
        self.base.set_needs_update(needs_update);
    }

    fn data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.base.data()
    }

    fn on_will_display(&self) -> Option<HeaderFooterCallback> {
        self.base.on_will_display()
    }

    fn on_did_end_display(&self) -> Option<HeaderFooterCallback> {
        self.base.on_did_end_display()
    }

    fn as_content_layout(&self) -> Option<&dyn ContentLayout> {
        Some(self)
    }
}

impl fmt::Debug for RowHeaderFooter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowHeaderFooter")
            .field("reuse_id", &self.base.reuse_id())
            .field("size", &self.base.size())
            .finish_non_exhaustive()
    }
}

assert_impl_all!(RowItem: Send, Sync);
assert_impl_all!(RowHeaderFooter: Send, Sync);
