//! Section descriptors grouping ordered items with an optional header
//! and footer.

use std::fmt;
use std::sync::Arc;

use cardstock_core::geometry::EdgeInsets;
use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use super::header_footer::HeaderFooterDescriptor;
use super::item::ItemDescriptor;
use super::{ReloadHook, ReloadKind};

/// The core trait for sections.
///
/// Identity is reference identity: the binder routes a section's reload
/// by searching the current list with `Arc::ptr_eq`, so the same
/// descriptor found at a new position after the caller replaces the
/// list still reloads at the right index.
pub trait SectionDescriptor: Send + Sync {
    /// Snapshot of the section's items in display order.
    fn items(&self) -> Vec<Arc<dyn ItemDescriptor>>;

    /// Returns the installed reload hook, if any.
    fn reload_hook(&self) -> Option<ReloadHook>;

    /// Installs a reload hook. The binder only installs into an empty
    /// slot.
    fn set_reload_hook(&self, hook: Option<ReloadHook>);

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Number of items, without materializing a snapshot.
    fn item_count(&self) -> usize {
        self.items().len()
    }

    /// The item at `index`, or `None` when out of range.
    fn item_at(&self, index: usize) -> Option<Arc<dyn ItemDescriptor>> {
        self.items().get(index).cloned()
    }

    /// The section's header descriptor.
    fn header(&self) -> Option<Arc<dyn HeaderFooterDescriptor>> {
        None
    }

    /// The section's footer descriptor.
    fn footer(&self) -> Option<Arc<dyn HeaderFooterDescriptor>> {
        None
    }

    /// Four-sided inset around this section's item run.
    fn inset(&self) -> EdgeInsets {
        EdgeInsets::ZERO
    }

    /// Spacing between lines along the scroll axis.
    fn line_spacing(&self) -> f32 {
        0.0
    }

    /// Spacing between items within a line.
    fn interitem_spacing(&self) -> f32 {
        0.0
    }

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Requests a refresh of this section through the installed hook.
    ///
    /// A no-op until a hook is wired.
    fn reload(&self, kind: ReloadKind) {
        if let Some(hook) = self.reload_hook() {
            hook(kind);
        }
    }
}

/// Default [`SectionDescriptor`] implementation.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use cardstock::model::{Item, Section};
/// use cardstock_core::geometry::EdgeInsets;
///
/// let section = Section::with_items(items)
///     .with_inset(EdgeInsets::uniform(16.0))
///     .with_line_spacing(8.0);
/// let section: Arc<dyn SectionDescriptor> = Arc::new(section);
/// ```
pub struct Section {
    state: Mutex<SectionState>,
}

struct SectionState {
    items: Vec<Arc<dyn ItemDescriptor>>,
    header: Option<Arc<dyn HeaderFooterDescriptor>>,
    footer: Option<Arc<dyn HeaderFooterDescriptor>>,
    inset: EdgeInsets,
    line_spacing: f32,
    interitem_spacing: f32,
    reload_hook: Option<ReloadHook>,
}

impl Section {
    /// Creates an empty section.
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Creates a section holding `items`.
    pub fn with_items(items: Vec<Arc<dyn ItemDescriptor>>) -> Self {
        Self {
            state: Mutex::new(SectionState {
                items,
                header: None,
                footer: None,
                inset: EdgeInsets::ZERO,
                line_spacing: 0.0,
                interitem_spacing: 0.0,
                reload_hook: None,
            }),
        }
    }

    /// Sets the header descriptor.
    pub fn with_header(self, header: Arc<dyn HeaderFooterDescriptor>) -> Self {
        self.set_header(Some(header));
        self
    }

    /// Sets the footer descriptor.
    pub fn with_footer(self, footer: Arc<dyn HeaderFooterDescriptor>) -> Self {
        self.set_footer(Some(footer));
        self
    }

    /// Sets the inset around the item run.
    pub fn with_inset(self, inset: EdgeInsets) -> Self {
        self.set_inset(inset);
        self
    }

    /// Sets the spacing between lines.
    pub fn with_line_spacing(self, spacing: f32) -> Self {
        self.set_line_spacing(spacing);
        self
    }

    /// Sets the spacing between items within a line.
    pub fn with_interitem_spacing(self, spacing: f32) -> Self {
        self.set_interitem_spacing(spacing);
        self
    }

    /// Replaces the item list. Call [`reload`](SectionDescriptor::reload)
    /// to surface the change.
    pub fn set_items(&self, items: Vec<Arc<dyn ItemDescriptor>>) {
        self.state.lock().items = items;
    }

    /// Appends one item.
    pub fn push_item(&self, item: Arc<dyn ItemDescriptor>) {
        self.state.lock().items.push(item);
    }

    /// Inserts one item, clamping `index` to the current length.
    pub fn insert_item(&self, index: usize, item: Arc<dyn ItemDescriptor>) {
        let mut state = self.state.lock();
        let index = index.min(state.items.len());
        state.items.insert(index, item);
    }

    pub fn set_header(&self, header: Option<Arc<dyn HeaderFooterDescriptor>>) {
        self.state.lock().header = header;
    }

    pub fn set_footer(&self, footer: Option<Arc<dyn HeaderFooterDescriptor>>) {
        self.state.lock().footer = footer;
    }

    pub fn set_inset(&self, inset: EdgeInsets) {
        self.state.lock().inset = inset;
    }

    pub fn set_line_spacing(&self, spacing: f32) {
        self.state.lock().line_spacing = spacing;
    }

    pub fn set_interitem_spacing(&self, spacing: f32) {
        self.state.lock().interitem_spacing = spacing;
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionDescriptor for Section {
    fn items(&self) -> Vec<Arc<dyn ItemDescriptor>> {
        self.state.lock().items.clone()
    }

    fn reload_hook(&self) -> Option<ReloadHook> {
        self.state.lock().reload_hook.clone()
    }

    fn set_reload_hook(&self, hook: Option<ReloadHook>) {
        self.state.lock().reload_hook = hook;
    }

    fn item_count(&self) -> usize {
        self.state.lock().items.len()
    }

    fn item_at(&self, index: usize) -> Option<Arc<dyn ItemDescriptor>> {
        self.state.lock().items.get(index).cloned()
    }

    fn header(&self) -> Option<Arc<dyn HeaderFooterDescriptor>> {
        self.state.lock().header.clone()
    }

    fn footer(&self) -> Option<Arc<dyn HeaderFooterDescriptor>> {
        self.state.lock().footer.clone()
    }

    fn inset(&self) -> EdgeInsets {
        self.state.lock().inset
    }

    fn line_spacing(&self) -> f32 {
        self.state.lock().line_spacing
    }

    fn interitem_spacing(&self) -> f32 {
        self.state.lock().interitem_spacing
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Section")
            .field("items", &state.items.len())
            .field("has_header", &state.header.is_some())
            .field("has_footer", &state.footer.is_some())
            .field("inset", &state.inset)
            .finish_non_exhaustive()
    }
}

assert_impl_all!(Section: Send, Sync);
