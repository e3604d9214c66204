//! The binding adapter between section descriptors and a host surface.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cardstock_core::geometry::{EdgeInsets, Point, Size};
use cardstock_core::thread_check::ThreadAffinity;
use parking_lot::Mutex;
use static_assertions::assert_impl_all;
use tracing::{debug, trace, warn};

use crate::error::{BindError, BindResult};
use crate::layout::{Axis, FlowSource, SupplementarySlot};
use crate::model::{
    AUTOMATIC_HEIGHT, AUTOMATIC_WIDTH, HeaderFooterDescriptor, ItemDescriptor, ItemIndex,
    ReloadHook, ReloadKind, SectionDescriptor,
};
use crate::reconcile::{Reconciler, UpdateBatch};
use crate::view::{CellView, HeaderFooterView};

use super::host::{GridHost, HostId, ScrollObserver};

type SharedSections = Arc<Mutex<Vec<Arc<dyn SectionDescriptor>>>>;

/// Drives a [`GridHost`] from a list of section descriptors.
///
/// The binder answers the host's count, element, and size queries,
/// deduplicates view registration, wires reload hooks into every
/// descriptor it manages, and pumps the update reconciler. Reloads
/// route by reference identity, so a descriptor keeps reloading
/// correctly after the caller reorders or replaces the list around it.
///
/// # Example
///
/// ```ignore
/// let mut binder = GridBinder::new();
/// binder.set_sections(&mut grid, vec![section]);
///
/// // Host callbacks route through the binder:
/// let sections = binder.section_count(&mut grid);
/// let cell = binder.cell_for(&mut grid, ItemIndex::new(0, 0))?;
///
/// // Each control tick, apply whatever settled:
/// binder.flush_updates(&mut grid, Instant::now());
/// ```
pub struct GridBinder {
    axis: Axis,
    sections: SharedSections,
    reconciler: Arc<Reconciler>,
    registered_cells: HashSet<String>,
    registered_headers: HashSet<String>,
    registered_footers: HashSet<String>,
    bound_host: Option<HostId>,
    scroll_observer: Option<Arc<dyn ScrollObserver>>,
    affinity: ThreadAffinity,
}

impl GridBinder {
    /// Creates a binder for a vertically scrolling surface.
    pub fn new() -> Self {
        Self::with_axis(Axis::Vertical)
    }

    /// Creates a binder for the given scroll axis.
    pub fn with_axis(axis: Axis) -> Self {
        Self {
            axis,
            sections: Arc::new(Mutex::new(Vec::new())),
            reconciler: Arc::new(Reconciler::new()),
            registered_cells: HashSet::new(),
            registered_headers: HashSet::new(),
            registered_footers: HashSet::new(),
            bound_host: None,
            scroll_observer: None,
            affinity: ThreadAffinity::current(),
        }
    }

    /// Replaces the reconciler, e.g. to change the quiet window.
    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = Arc::new(reconciler);
        self
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The reconciler handle, for enqueueing directly.
    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    /// Installs the scroll observer.
    pub fn set_scroll_observer(&mut self, observer: Option<Arc<dyn ScrollObserver>>) {
        self.scroll_observer = observer;
    }

    // -------------------------------------------------------------------------
    // Binding and content
    // -------------------------------------------------------------------------

    /// Attaches to a host, re-registering content when the host
    /// instance changed since the last attach.
    pub fn bind(&mut self, host: &mut dyn GridHost) {
        self.affinity.debug_assert_same_thread();
        self.ensure_bound(host);
        self.register_content(host);
        self.refresh_placeholder(host);
    }

    /// Replaces the whole section list.
    pub fn set_sections(
        &mut self,
        host: &mut dyn GridHost,
        sections: Vec<Arc<dyn SectionDescriptor>>,
    ) {
        self.affinity.debug_assert_same_thread();
        *self.sections.lock() = sections;
        self.ensure_bound(host);
        self.register_content(host);
        self.wire_reload_hooks();
    }

    /// Snapshot of the current section list.
    pub fn sections(&self) -> Vec<Arc<dyn SectionDescriptor>> {
        self.sections.lock().clone()
    }

    /// The section at `index`, or `None` when out of range.
    pub fn section_at(&self, index: usize) -> Option<Arc<dyn SectionDescriptor>> {
        self.sections.lock().get(index).cloned()
    }

    /// The item at `index`, or `None` when out of range.
    pub fn item_at(&self, index: ItemIndex) -> Option<Arc<dyn ItemDescriptor>> {
        self.section_at(index.section)?.item_at(index.item)
    }

    fn ensure_bound(&mut self, host: &mut dyn GridHost) {
        let id = host.id();
        if self.bound_host == Some(id) {
            return;
        }
        if self.bound_host.is_some() {
            debug!(
                target: "cardstock::bind",
                ?id,
                "host instance changed, resetting view registration"
            );
            self.registered_cells.clear();
            self.registered_headers.clear();
            self.registered_footers.clear();
        }
        self.bound_host = Some(id);
    }

    /// Registers any reuse identifier not yet seen on this host.
    fn register_content(&mut self, host: &mut dyn GridHost) {
        let sections = self.sections.lock().clone();
        for section in &sections {
            for item in section.items() {
                let reuse_id = item.reuse_id();
                if self.registered_cells.insert(reuse_id.clone()) {
                    host.register_cell(&reuse_id, item.cell_factory());
                }
            }
            if let Some(header) = section.header() {
                let reuse_id = header.reuse_id();
                if self.registered_headers.insert(reuse_id.clone()) {
                    host.register_header(&reuse_id, header.view_factory());
                }
            }
            if let Some(footer) = section.footer() {
                let reuse_id = footer.reuse_id();
                if self.registered_footers.insert(reuse_id.clone()) {
                    host.register_footer(&reuse_id, footer.view_factory());
                }
            }
        }
    }

    /// Installs reload hooks into every descriptor whose slot is empty.
    ///
    /// Hooks capture weak references, so neither the binder nor the
    /// descriptors keep each other alive.
    fn wire_reload_hooks(&self) {
        let sections = self.sections.lock().clone();
        for section in &sections {
            if section.reload_hook().is_none() {
                section.set_reload_hook(Some(self.section_hook(section)));
            }
            for item in section.items() {
                if item.reload_hook().is_none() {
                    item.set_reload_hook(Some(self.item_hook(&item)));
                }
            }
            if let Some(header) = section.header() {
                if header.reload_hook().is_none() {
                    header.set_reload_hook(Some(self.supplementary_hook(section)));
                }
            }
            if let Some(footer) = section.footer() {
                if footer.reload_hook().is_none() {
                    footer.set_reload_hook(Some(self.supplementary_hook(section)));
                }
            }
        }
    }

    fn section_hook(&self, section: &Arc<dyn SectionDescriptor>) -> ReloadHook {
        let sections = Arc::downgrade(&self.sections);
        let reconciler = Arc::downgrade(&self.reconciler);
        let section = Arc::downgrade(section);
        Arc::new(move |kind| {
            let (Some(sections), Some(reconciler), Some(section)) =
                (sections.upgrade(), reconciler.upgrade(), section.upgrade())
            else {
                return;
            };
            match kind {
                ReloadKind::ReloadAll => reconciler.reload_all(),
                ReloadKind::Reload => {
                    // Resolve the index at request time, not at wiring
                    // time: the list may have been reordered since.
                    let index = sections
                        .lock()
                        .iter()
                        .position(|candidate| Arc::ptr_eq(candidate, &section));
                    match index {
                        Some(index) => reconciler.reload_sections([index]),
                        None => warn!(
                            target: "cardstock::bind",
                            "reload requested for a section that is no longer bound"
                        ),
                    }
                }
                ReloadKind::Rerender => {
                    // A section repaint is a repaint of each of its
                    // items.
                    reconciler.reload_items(&section.items(), ReloadKind::Rerender);
                }
            }
        })
    }

    fn item_hook(&self, item: &Arc<dyn ItemDescriptor>) -> ReloadHook {
        let reconciler = Arc::downgrade(&self.reconciler);
        let item = Arc::downgrade(item);
        Arc::new(move |kind| {
            let (Some(reconciler), Some(item)) = (reconciler.upgrade(), item.upgrade()) else {
                return;
            };
            reconciler.reload_item(&item, kind);
        })
    }

    /// Headers and footers refresh through their owning section; hosts
    /// have no narrower way to reload a supplementary view.
    fn supplementary_hook(&self, section: &Arc<dyn SectionDescriptor>) -> ReloadHook {
        let sections = Arc::downgrade(&self.sections);
        let reconciler = Arc::downgrade(&self.reconciler);
        let section = Arc::downgrade(section);
        Arc::new(move |kind| {
            let (Some(sections), Some(reconciler), Some(section)) =
                (sections.upgrade(), reconciler.upgrade(), section.upgrade())
            else {
                return;
            };
            if kind == ReloadKind::ReloadAll {
                reconciler.reload_all();
                return;
            }
            let index = sections
                .lock()
                .iter()
                .position(|candidate| Arc::ptr_eq(candidate, &section));
            match index {
                Some(index) => reconciler.reload_sections([index]),
                None => warn!(
                    target: "cardstock::bind",
                    "reload requested for a header/footer whose section is no longer bound"
                ),
            }
        })
    }

    // -------------------------------------------------------------------------
    // Host count queries
    // -------------------------------------------------------------------------

    /// Number of sections.
    ///
    /// This is the host's first query of every display pass, so the
    /// lazy data-did-update step runs here: late-added descriptors get
    /// registered and wired, and the placeholder refreshes.
    pub fn section_count(&mut self, host: &mut dyn GridHost) -> usize {
        self.affinity.debug_assert_same_thread();
        self.ensure_bound(host);
        self.register_content(host);
        self.wire_reload_hooks();
        self.refresh_placeholder(host);
        self.sections.lock().len()
    }

    /// Number of items in one section; zero when out of range.
    pub fn item_count(&self, section: usize) -> usize {
        self.sections
            .lock()
            .get(section)
            .map(|section| section.item_count())
            .unwrap_or(0)
    }

    /// The placeholder shows while there is nothing to display.
    fn refresh_placeholder(&self, host: &mut dyn GridHost) {
        let visible = {
            let sections = self.sections.lock();
            sections.is_empty() || sections.iter().all(|section| section.item_count() == 0)
        };
        host.set_placeholder_visible(visible);
    }

    // -------------------------------------------------------------------------
    // Element acquisition
    // -------------------------------------------------------------------------

    /// Dequeues and renders the cell for `index`.
    ///
    /// Rendering happens here, at acquisition: hosts do not guarantee
    /// the will-display callback runs synchronously with dequeue, and
    /// the content must be in place for the first paint.
    pub fn cell_for<'a>(
        &self,
        host: &'a mut dyn GridHost,
        index: ItemIndex,
    ) -> BindResult<&'a mut dyn CellView> {
        self.affinity.debug_assert_same_thread();
        let Some(item) = self.item_at(index) else {
            debug_assert!(false, "cell requested for a missing item at {index}");
            return Err(BindError::ItemOutOfRange { index });
        };
        let reuse_id = item.reuse_id();
        let Some(cell) = host.acquire_cell(&reuse_id, index) else {
            return Err(BindError::UnregisteredReuseId(reuse_id));
        };
        cell.render(&item);
        Ok(cell)
    }

    /// Dequeues the header view for `section`. Supplementary views
    /// render at will-display, not here.
    pub fn header_for<'a>(
        &self,
        host: &'a mut dyn GridHost,
        section: usize,
    ) -> BindResult<&'a mut dyn HeaderFooterView> {
        self.supplementary_for(host, section, SupplementarySlot::Header)
    }

    /// Dequeues the footer view for `section`.
    pub fn footer_for<'a>(
        &self,
        host: &'a mut dyn GridHost,
        section: usize,
    ) -> BindResult<&'a mut dyn HeaderFooterView> {
        self.supplementary_for(host, section, SupplementarySlot::Footer)
    }

    fn supplementary_for<'a>(
        &self,
        host: &'a mut dyn GridHost,
        section: usize,
        slot: SupplementarySlot,
    ) -> BindResult<&'a mut dyn HeaderFooterView> {
        self.affinity.debug_assert_same_thread();
        let Some(descriptor) = self.supplementary_at(section, slot) else {
            debug_assert!(false, "{slot} requested for section {section} which has none");
            return Err(BindError::HeaderFooterMissing { slot, section });
        };
        let reuse_id = descriptor.reuse_id();
        let view = match slot {
            SupplementarySlot::Header => host.acquire_header(&reuse_id, section),
            SupplementarySlot::Footer => host.acquire_footer(&reuse_id, section),
        };
        view.ok_or(BindError::UnregisteredReuseId(reuse_id))
    }

    fn supplementary_at(
        &self,
        section: usize,
        slot: SupplementarySlot,
    ) -> Option<Arc<dyn HeaderFooterDescriptor>> {
        let section = self.section_at(section)?;
        match slot {
            SupplementarySlot::Header => section.header(),
            SupplementarySlot::Footer => section.footer(),
        }
    }

    // -------------------------------------------------------------------------
    // Visibility routing
    // -------------------------------------------------------------------------

    /// The cell at `index` is about to display. The item's callback
    /// runs before the cell's own lifecycle method.
    pub fn will_display_cell(&self, cell: &mut dyn CellView, index: ItemIndex) {
        if let Some(item) = self.item_at(index) {
            if let Some(callback) = item.on_will_display() {
                callback(&item);
            }
        }
        cell.will_display();
    }

    /// The cell at `index` left the visible region.
    pub fn did_end_display_cell(&self, cell: &mut dyn CellView, index: ItemIndex) {
        if let Some(item) = self.item_at(index) {
            if let Some(callback) = item.on_did_end_display() {
                callback(&item);
            }
        }
        cell.did_end_display();
    }

    /// The header for `section` is about to display; it renders first
    /// so the first frame on screen already shows current content.
    pub fn will_display_header(&self, view: &mut dyn HeaderFooterView, section: usize) {
        self.will_display_supplementary(view, section, SupplementarySlot::Header);
    }

    /// The footer for `section` is about to display.
    pub fn will_display_footer(&self, view: &mut dyn HeaderFooterView, section: usize) {
        self.will_display_supplementary(view, section, SupplementarySlot::Footer);
    }

    fn will_display_supplementary(
        &self,
        view: &mut dyn HeaderFooterView,
        section: usize,
        slot: SupplementarySlot,
    ) {
        let Some(descriptor) = self.supplementary_at(section, slot) else {
            return;
        };
        view.render(&descriptor);
        if let Some(callback) = descriptor.on_will_display() {
            callback(&descriptor);
        }
    }

    /// The header for `section` left the visible region.
    pub fn did_end_display_header(&self, section: usize) {
        self.did_end_display_supplementary(section, SupplementarySlot::Header);
    }

    /// The footer for `section` left the visible region.
    pub fn did_end_display_footer(&self, section: usize) {
        self.did_end_display_supplementary(section, SupplementarySlot::Footer);
    }

    fn did_end_display_supplementary(&self, section: usize, slot: SupplementarySlot) {
        if let Some(descriptor) = self.supplementary_at(section, slot) {
            if let Some(callback) = descriptor.on_did_end_display() {
                callback(&descriptor);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Selection and highlight
    // -------------------------------------------------------------------------

    /// Whether the element at `index` may highlight; `true` when the
    /// item is missing.
    pub fn should_highlight(&self, index: ItemIndex) -> bool {
        self.item_at(index)
            .map_or(true, |item| item.should_highlight())
    }

    /// Whether the element at `index` may be selected.
    pub fn should_select(&self, index: ItemIndex) -> bool {
        self.item_at(index)
            .map_or(true, |item| item.should_select())
    }

    /// Whether the element at `index` may be deselected.
    pub fn should_deselect(&self, index: ItemIndex) -> bool {
        self.item_at(index)
            .map_or(true, |item| item.should_deselect())
    }

    /// The element at `index` was selected.
    pub fn did_select(&self, index: ItemIndex) {
        if let Some(item) = self.item_at(index) {
            if let Some(callback) = item.on_select() {
                callback(&item);
            }
        }
    }

    /// The element at `index` was deselected.
    pub fn did_deselect(&self, index: ItemIndex) {
        if let Some(item) = self.item_at(index) {
            if let Some(callback) = item.on_deselect() {
                callback(&item);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Size resolution
    // -------------------------------------------------------------------------

    /// Resolved size for the item at `index`.
    ///
    /// An automatic cross-axis dimension becomes the container extent
    /// minus the section and host insets, floored; an automatic
    /// main-axis dimension becomes zero. Extents never go negative.
    pub fn item_size(&self, host: &dyn GridHost, index: ItemIndex) -> Size {
        let Some(item) = self.item_at(index) else {
            debug_assert!(false, "size requested for a missing item at {index}");
            return Size::ZERO;
        };
        let section_inset = self
            .section_at(index.section)
            .map(|section| section.inset())
            .unwrap_or(EdgeInsets::ZERO);
        self.resolve_size(item.size(), section_inset, host)
    }

    fn resolve_size(&self, size: Size, section_inset: EdgeInsets, host: &dyn GridHost) -> Size {
        let container = host.container_size();
        let content_inset = host.content_inset();
        let mut resolved = size;
        match self.axis {
            Axis::Vertical => {
                if resolved.height == AUTOMATIC_HEIGHT {
                    resolved.height = 0.0;
                }
                if resolved.width == AUTOMATIC_WIDTH {
                    resolved.width = (container.width
                        - section_inset.horizontal()
                        - content_inset.horizontal())
                    .floor();
                }
            }
            Axis::Horizontal => {
                if resolved.width == AUTOMATIC_WIDTH {
                    resolved.width = 0.0;
                }
                if resolved.height == AUTOMATIC_HEIGHT {
                    resolved.height = (container.height
                        - section_inset.vertical()
                        - content_inset.vertical())
                    .floor();
                }
            }
        }
        resolved.width = resolved.width.max(0.0);
        resolved.height = resolved.height.max(0.0);
        resolved
    }

    /// Extent of the section's header along the scroll axis; zero when
    /// the section is out of range or has no header.
    pub fn header_extent(&self, section: usize) -> f32 {
        self.supplementary_extent(section, SupplementarySlot::Header)
    }

    /// Extent of the section's footer along the scroll axis.
    pub fn footer_extent(&self, section: usize) -> f32 {
        self.supplementary_extent(section, SupplementarySlot::Footer)
    }

    fn supplementary_extent(&self, section: usize, slot: SupplementarySlot) -> f32 {
        let Some(descriptor) = self.supplementary_at(section, slot) else {
            return 0.0;
        };
        let size = descriptor.size();
        let extent = match self.axis {
            Axis::Vertical => size.height,
            Axis::Horizontal => size.width,
        };
        extent.max(0.0)
    }

    /// Section inset; zero when out of range.
    pub fn section_inset(&self, section: usize) -> EdgeInsets {
        self.section_at(section)
            .map_or(EdgeInsets::ZERO, |section| section.inset())
    }

    /// Line spacing; zero when out of range.
    pub fn line_spacing(&self, section: usize) -> f32 {
        self.section_at(section)
            .map_or(0.0, |section| section.line_spacing())
    }

    /// Interitem spacing; zero when out of range.
    pub fn interitem_spacing(&self, section: usize) -> f32 {
        self.section_at(section)
            .map_or(0.0, |section| section.interitem_spacing())
    }

    // -------------------------------------------------------------------------
    // Bulk layout refresh
    // -------------------------------------------------------------------------

    /// Pushes the container geometry into every layout-capable
    /// descriptor and recomputes their sizes, optionally forcing a full
    /// reload afterwards.
    pub fn update_layout(&self, host: &mut dyn GridHost, needs_reload: bool) {
        self.affinity.debug_assert_same_thread();
        let container = host.container_size();
        let sections = self.sections.lock().clone();
        for section in &sections {
            if let Some(header) = section.header() {
                if let Some(layout) = header.as_content_layout() {
                    layout.set_container_size(container);
                    layout.update_layout();
                }
            }
            if let Some(footer) = section.footer() {
                if let Some(layout) = footer.as_content_layout() {
                    layout.set_container_size(container);
                    layout.update_layout();
                }
            }
            let inset = section.inset();
            for item in section.items() {
                if let Some(layout) = item.as_item_layout() {
                    layout.set_section_inset(inset);
                    layout.set_container_size(container);
                    layout.update_layout();
                }
            }
        }
        if needs_reload {
            host.reload_all();
        }
    }

    // -------------------------------------------------------------------------
    // Update application
    // -------------------------------------------------------------------------

    /// Flushes the reconciler if its quiet window elapsed and applies
    /// the batch to the host. Returns `true` when something applied.
    ///
    /// Drive this from the host's control timeline; an idle reconciler
    /// returns immediately.
    pub fn flush_updates(&self, host: &mut dyn GridHost, now: Instant) -> bool {
        let Some(batch) = self.reconciler.flush_due(now) else {
            return false;
        };
        self.apply_batch(host, batch);
        true
    }

    /// Time until the next flush is due, for hosts scheduling wakeups.
    pub fn time_until_flush(&self, now: Instant) -> Option<Duration> {
        self.reconciler.time_until_flush(now)
    }

    fn apply_batch(&self, host: &mut dyn GridHost, batch: UpdateBatch) {
        match batch {
            UpdateBatch::ReloadAll => host.reload_all(),
            UpdateBatch::ReloadSections(sections) => {
                let count = self.sections.lock().len();
                let in_range: BTreeSet<usize> = sections
                    .into_iter()
                    .filter(|index| *index < count)
                    .collect();
                if !in_range.is_empty() {
                    host.reload_sections(&in_range);
                }
            }
            UpdateBatch::ReloadItems(items) => self.apply_item_reloads(host, items),
            UpdateBatch::InsertItems(indices) => host.insert_cells(&indices),
        }
    }

    fn apply_item_reloads(
        &self,
        host: &mut dyn GridHost,
        items: Vec<(Arc<dyn ItemDescriptor>, ReloadKind)>,
    ) {
        let mut structural: Vec<ItemIndex> = Vec::new();
        for (item, kind) in items {
            let paths = self.index_paths_of(&item);
            if paths.is_empty() {
                warn!(
                    target: "cardstock::bind",
                    reuse_id = %item.reuse_id(),
                    "reload requested for an item that is no longer bound"
                );
                continue;
            }
            match kind {
                ReloadKind::Reload | ReloadKind::ReloadAll => structural.extend(paths),
                ReloadKind::Rerender => {
                    for index in paths {
                        match host.visible_cell(index) {
                            Some(cell) => cell.render(&item),
                            None => trace!(
                                target: "cardstock::bind",
                                %index,
                                "skipped repaint of an offscreen cell"
                            ),
                        }
                    }
                }
            }
        }
        if !structural.is_empty() {
            host.reload_cells(&structural);
        }
    }

    /// Every current position of `item`, searched by identity across
    /// all sections.
    fn index_paths_of(&self, item: &Arc<dyn ItemDescriptor>) -> Vec<ItemIndex> {
        let sections = self.sections.lock();
        let mut paths = Vec::new();
        for (section_index, section) in sections.iter().enumerate() {
            for (item_index, candidate) in section.items().iter().enumerate() {
                if Arc::ptr_eq(candidate, item) {
                    paths.push(ItemIndex::new(section_index, item_index));
                }
            }
        }
        paths
    }

    // -------------------------------------------------------------------------
    // Layout source
    // -------------------------------------------------------------------------

    /// A [`FlowSource`] view over the bound content, for driving a
    /// layout pass.
    pub fn flow_source<'a>(&'a self, host: &'a dyn GridHost) -> BinderSource<'a> {
        BinderSource { binder: self, host }
    }

    // -------------------------------------------------------------------------
    // Scroll event forwarding
    // -------------------------------------------------------------------------

    /// The content offset changed.
    pub fn did_scroll(&self, offset: Point) {
        if let Some(observer) = &self.scroll_observer {
            observer.did_scroll(offset);
        }
    }

    /// A drag is about to begin.
    pub fn will_begin_dragging(&self) {
        if let Some(observer) = &self.scroll_observer {
            observer.will_begin_dragging();
        }
    }

    /// A drag is ending; the observer may rewrite `target`.
    pub fn will_end_dragging(&self, velocity: Point, target: &mut Point) {
        if let Some(observer) = &self.scroll_observer {
            observer.will_end_dragging(velocity, target);
        }
    }

    /// The drag ended.
    pub fn did_end_dragging(&self, decelerating: bool) {
        if let Some(observer) = &self.scroll_observer {
            observer.did_end_dragging(decelerating);
        }
    }

    pub fn will_begin_decelerating(&self) {
        if let Some(observer) = &self.scroll_observer {
            observer.will_begin_decelerating();
        }
    }

    pub fn did_end_decelerating(&self) {
        if let Some(observer) = &self.scroll_observer {
            observer.did_end_decelerating();
        }
    }

    /// A programmatic scroll animation finished.
    pub fn did_end_scrolling_animation(&self) {
        if let Some(observer) = &self.scroll_observer {
            observer.did_end_scrolling_animation();
        }
    }

    /// Whether scroll-to-top may proceed; `true` without an observer.
    pub fn should_scroll_to_top(&self) -> bool {
        self.scroll_observer
            .as_ref()
            .map_or(true, |observer| observer.should_scroll_to_top())
    }

    pub fn did_scroll_to_top(&self) {
        if let Some(observer) = &self.scroll_observer {
            observer.did_scroll_to_top();
        }
    }

    /// The host's effective content insets changed.
    pub fn did_change_content_inset(&self) {
        if let Some(observer) = &self.scroll_observer {
            observer.did_change_content_inset();
        }
    }
}

impl Default for GridBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GridBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridBinder")
            .field("axis", &self.axis)
            .field("sections", &self.sections.lock().len())
            .field("bound_host", &self.bound_host)
            .finish_non_exhaustive()
    }
}

assert_impl_all!(GridBinder: Send, Sync);

/// [`FlowSource`] implementation over a binder and its host.
pub struct BinderSource<'a> {
    binder: &'a GridBinder,
    host: &'a dyn GridHost,
}

impl FlowSource for BinderSource<'_> {
    fn section_count(&self) -> usize {
        self.binder.sections.lock().len()
    }

    fn item_count(&self, section: usize) -> usize {
        self.binder.item_count(section)
    }

    fn item_size(&self, index: ItemIndex) -> Size {
        self.binder.item_size(self.host, index)
    }

    fn section_inset(&self, section: usize) -> EdgeInsets {
        self.binder.section_inset(section)
    }

    fn line_spacing(&self, section: usize) -> f32 {
        self.binder.line_spacing(section)
    }

    fn interitem_spacing(&self, section: usize) -> f32 {
        self.binder.interitem_spacing(section)
    }

    fn header_extent(&self, section: usize) -> f32 {
        self.binder.header_extent(section)
    }

    fn footer_extent(&self, section: usize) -> f32 {
        self.binder.footer_extent(section)
    }

    fn separator_override(&self, index: ItemIndex) -> Option<bool> {
        let item = self.binder.item_at(index)?;
        let layout = item.as_item_layout()?;
        if layout.ignores_separator_hidden() {
            return None;
        }
        Some(layout.separator_hidden())
    }
}
