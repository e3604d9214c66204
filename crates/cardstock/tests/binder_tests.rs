//! Tests for binding descriptors to a host grid.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{DefaultKey, SlotMap};

use cardstock::{
    CellFactory, CellView, DEFAULT_DEBOUNCE, GridBinder, GridHost, HeaderFooter,
    HeaderFooterDescriptor, HeaderFooterFactory, HeaderFooterView, HostId, Item, ItemDescriptor,
    ItemIndex, ReloadKind, RowItem, Section, SectionDescriptor, Size,
};

/// An instant safely past the quiet window of anything enqueued now.
fn after_window() -> Instant {
    Instant::now() + DEFAULT_DEBOUNCE + Duration::from_millis(10)
}

// =============================================================================
// Host and view doubles
// =============================================================================

/// Pools cells the way a real grid widget does and records every
/// refresh command the binder issues.
struct MockGrid {
    id: HostId,
    container: Size,
    cell_factories: HashMap<String, CellFactory>,
    header_factories: HashMap<String, HeaderFooterFactory>,
    footer_factories: HashMap<String, HeaderFooterFactory>,
    cells: SlotMap<DefaultKey, Box<dyn CellView>>,
    visible: HashMap<ItemIndex, DefaultKey>,
    headers: HashMap<usize, Box<dyn HeaderFooterView>>,
    reload_all_count: usize,
    reloaded_sections: Vec<BTreeSet<usize>>,
    reloaded_cells: Vec<Vec<ItemIndex>>,
    inserted: Vec<Vec<ItemIndex>>,
    placeholder: Option<bool>,
}

impl MockGrid {
    fn new(container: Size) -> Self {
        Self {
            id: HostId::next(),
            container,
            cell_factories: HashMap::new(),
            header_factories: HashMap::new(),
            footer_factories: HashMap::new(),
            cells: SlotMap::new(),
            visible: HashMap::new(),
            headers: HashMap::new(),
            reload_all_count: 0,
            reloaded_sections: Vec::new(),
            reloaded_cells: Vec::new(),
            inserted: Vec::new(),
            placeholder: None,
        }
    }
}

impl GridHost for MockGrid {
    fn id(&self) -> HostId {
        self.id
    }

    fn container_size(&self) -> Size {
        self.container
    }

    fn register_cell(&mut self, reuse_id: &str, factory: CellFactory) {
        self.cell_factories.insert(reuse_id.to_string(), factory);
    }

    fn register_header(&mut self, reuse_id: &str, factory: HeaderFooterFactory) {
        self.header_factories.insert(reuse_id.to_string(), factory);
    }

    fn register_footer(&mut self, reuse_id: &str, factory: HeaderFooterFactory) {
        self.footer_factories.insert(reuse_id.to_string(), factory);
    }

    fn acquire_cell(&mut self, reuse_id: &str, index: ItemIndex) -> Option<&mut dyn CellView> {
        let factory = self.cell_factories.get(reuse_id)?;
        let key = self.cells.insert(factory());
        self.visible.insert(index, key);
        Some(self.cells[key].as_mut())
    }

    fn acquire_header(
        &mut self,
        reuse_id: &str,
        section: usize,
    ) -> Option<&mut dyn HeaderFooterView> {
        let factory = self.header_factories.get(reuse_id)?;
        let view = factory();
        self.headers.insert(section, view);
        Some(self.headers.get_mut(&section).unwrap().as_mut())
    }

    fn acquire_footer(
        &mut self,
        _reuse_id: &str,
        _section: usize,
    ) -> Option<&mut dyn HeaderFooterView> {
        None
    }

    fn visible_cell(&mut self, index: ItemIndex) -> Option<&mut dyn CellView> {
        let key = *self.visible.get(&index)?;
        Some(self.cells.get_mut(key)?.as_mut())
    }

    fn reload_all(&mut self) {
        self.reload_all_count += 1;
    }

    fn reload_sections(&mut self, sections: &BTreeSet<usize>) {
        self.reloaded_sections.push(sections.clone());
    }

    fn reload_cells(&mut self, indices: &[ItemIndex]) {
        self.reloaded_cells.push(indices.to_vec());
    }

    fn insert_cells(&mut self, indices: &[ItemIndex]) {
        self.inserted.push(indices.to_vec());
    }

    fn set_placeholder_visible(&mut self, visible: bool) {
        self.placeholder = Some(visible);
    }
}

/// Counts renders and remembers the last string payload it was given.
#[derive(Default)]
struct ProbeCell {
    render_count: usize,
    last_text: Option<String>,
}

impl CellView for ProbeCell {
    fn render(&mut self, item: &Arc<dyn ItemDescriptor>) {
        self.render_count += 1;
        if let Some(data) = item.data() {
            if let Some(text) = data.downcast_ref::<String>() {
                self.last_text = Some(text.clone());
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Appends every lifecycle call to a shared log.
struct LogCell {
    log: Arc<Mutex<Vec<String>>>,
}

impl CellView for LogCell {
    fn render(&mut self, _item: &Arc<dyn ItemDescriptor>) {
        self.log.lock().push("render".into());
    }

    fn will_display(&mut self) {
        self.log.lock().push("cell-will".into());
    }

    fn did_end_display(&mut self) {
        self.log.lock().push("cell-end".into());
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct LogHeader {
    log: Arc<Mutex<Vec<String>>>,
}

impl HeaderFooterView for LogHeader {
    fn render(&mut self, _header_footer: &Arc<dyn HeaderFooterDescriptor>) {
        self.log.lock().push("render".into());
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn probe_item(text: &str) -> Arc<dyn ItemDescriptor> {
    Arc::new(
        Item::new::<ProbeCell>()
            .with_size(Size::new(320.0, 44.0))
            .with_data(Arc::new(text.to_string())),
    )
}

fn single_section(items: Vec<Arc<dyn ItemDescriptor>>) -> Vec<Arc<dyn SectionDescriptor>> {
    vec![Arc::new(Section::with_items(items))]
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_cell_renders_at_acquisition() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();
    binder.set_sections(&mut grid, single_section(vec![probe_item("hello")]));

    let index = ItemIndex::new(0, 0);
    let cell = binder.cell_for(&mut grid, index).unwrap();
    let probe = cell.as_any_mut().downcast_mut::<ProbeCell>().unwrap();
    assert_eq!(probe.render_count, 1);
    assert_eq!(probe.last_text.as_deref(), Some("hello"));
}

#[test]
fn test_rerender_repaints_visible_cell_in_place() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();
    let item = Arc::new(
        Item::new::<ProbeCell>()
            .with_size(Size::new(320.0, 44.0))
            .with_data(Arc::new("v1".to_string())),
    );
    binder.set_sections(
        &mut grid,
        single_section(vec![item.clone() as Arc<dyn ItemDescriptor>]),
    );

    let index = ItemIndex::new(0, 0);
    binder.cell_for(&mut grid, index).unwrap();

    item.set_data(Some(Arc::new("v2".to_string())));
    item.reload(ReloadKind::Rerender);
    assert!(binder.flush_updates(&mut grid, after_window()));

    let probe = grid
        .visible_cell(index)
        .unwrap()
        .as_any_mut()
        .downcast_mut::<ProbeCell>()
        .unwrap();
    assert_eq!(probe.render_count, 2);
    assert_eq!(probe.last_text.as_deref(), Some("v2"));

    // A repaint never goes through the structural reload path.
    assert!(grid.reloaded_cells.is_empty());
    assert_eq!(grid.reload_all_count, 0);
}

#[test]
fn test_reload_requests_structural_refresh() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();
    let item = probe_item("row");
    binder.set_sections(&mut grid, single_section(vec![item.clone()]));

    let index = ItemIndex::new(0, 0);
    binder.cell_for(&mut grid, index).unwrap();

    item.reload(ReloadKind::Reload);
    assert!(binder.flush_updates(&mut grid, after_window()));

    assert_eq!(grid.reloaded_cells, vec![vec![index]]);
    // The host re-queries; the binder does not repaint on its own.
    let probe = grid
        .visible_cell(index)
        .unwrap()
        .as_any_mut()
        .downcast_mut::<ProbeCell>()
        .unwrap();
    assert_eq!(probe.render_count, 1);
}

#[test]
fn test_section_reload_routes_by_identity_after_reorder() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    let first: Arc<dyn SectionDescriptor> =
        Arc::new(Section::with_items(vec![probe_item("a")]));
    let second: Arc<dyn SectionDescriptor> =
        Arc::new(Section::with_items(vec![probe_item("b")]));
    binder.set_sections(&mut grid, vec![first.clone(), second.clone()]);

    second.reload(ReloadKind::Reload);
    assert!(binder.flush_updates(&mut grid, after_window()));
    assert_eq!(grid.reloaded_sections, vec![BTreeSet::from([1])]);

    // After a reorder the same descriptor resolves to its new slot.
    binder.set_sections(&mut grid, vec![second.clone(), first]);
    second.reload(ReloadKind::Reload);
    assert!(binder.flush_updates(&mut grid, after_window()));
    assert_eq!(
        grid.reloaded_sections,
        vec![BTreeSet::from([1]), BTreeSet::from([0])]
    );
}

#[test]
fn test_burst_of_item_reloads_escalates_to_full_reload() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    let items: Vec<Arc<dyn ItemDescriptor>> = (0..6).map(|i| probe_item(&i.to_string())).collect();
    binder.set_sections(&mut grid, single_section(items.clone()));

    for item in &items {
        item.reload(ReloadKind::Reload);
    }
    assert!(binder.flush_updates(&mut grid, after_window()));

    assert_eq!(grid.reload_all_count, 1);
    assert!(grid.reloaded_cells.is_empty());
}

#[test]
fn test_section_rerender_repaints_every_visible_item() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    let items: Vec<Arc<dyn ItemDescriptor>> = (0..3).map(|i| probe_item(&i.to_string())).collect();
    let section: Arc<dyn SectionDescriptor> = Arc::new(Section::with_items(items));
    binder.set_sections(&mut grid, vec![section.clone()]);

    // Only two of the three rows are on screen.
    binder.cell_for(&mut grid, ItemIndex::new(0, 0)).unwrap();
    binder.cell_for(&mut grid, ItemIndex::new(0, 1)).unwrap();

    section.reload(ReloadKind::Rerender);
    assert!(binder.flush_updates(&mut grid, after_window()));

    for item in 0..2 {
        let probe = grid
            .visible_cell(ItemIndex::new(0, item))
            .unwrap()
            .as_any_mut()
            .downcast_mut::<ProbeCell>()
            .unwrap();
        assert_eq!(probe.render_count, 2);
    }
    assert_eq!(grid.reload_all_count, 0);
    assert!(grid.reloaded_sections.is_empty());
}

#[test]
fn test_vanished_item_reload_touches_nothing() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    let item = probe_item("gone");
    let section = Arc::new(Section::with_items(vec![item.clone()]));
    binder.set_sections(&mut grid, vec![section.clone()]);

    item.reload(ReloadKind::Reload);
    section.set_items(Vec::new());

    // The batch flushes, but the orphaned request is dropped.
    assert!(binder.flush_updates(&mut grid, after_window()));
    assert_eq!(grid.reload_all_count, 0);
    assert!(grid.reloaded_cells.is_empty());
    assert!(grid.reloaded_sections.is_empty());
}

#[test]
fn test_out_of_range_section_reloads_are_filtered() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();
    binder.set_sections(&mut grid, single_section(vec![probe_item("only")]));

    binder.reconciler().reload_sections([0, 7]);
    assert!(binder.flush_updates(&mut grid, after_window()));

    assert_eq!(grid.reloaded_sections, vec![BTreeSet::from([0])]);
}

#[test]
fn test_inserts_flow_through_to_the_host() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();
    let section = Arc::new(Section::with_items(vec![probe_item("a")]));
    binder.set_sections(&mut grid, vec![section.clone()]);

    section.push_item(probe_item("b"));
    binder.reconciler().insert_items(&[ItemIndex::new(0, 1)]);
    assert!(binder.flush_updates(&mut grid, after_window()));

    assert_eq!(grid.inserted, vec![vec![ItemIndex::new(0, 1)]]);
    assert_eq!(grid.reload_all_count, 0);
}

#[test]
fn test_display_lifecycle_order() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let cell_log = Arc::clone(&log);
    let will_log = Arc::clone(&log);
    let end_log = Arc::clone(&log);
    let item: Arc<dyn ItemDescriptor> = Arc::new(
        Item::with_factory(
            "log-cell",
            Arc::new(move || {
                Box::new(LogCell {
                    log: Arc::clone(&cell_log),
                }) as Box<dyn CellView>
            }),
        )
        .with_on_will_display(move |_| will_log.lock().push("item-will".into()))
        .with_on_did_end_display(move |_| end_log.lock().push("item-end".into())),
    );
    binder.set_sections(&mut grid, single_section(vec![item]));

    let index = ItemIndex::new(0, 0);
    binder.cell_for(&mut grid, index).unwrap();
    let cell = grid.visible_cell(index).unwrap();
    binder.will_display_cell(cell, index);
    let cell = grid.visible_cell(index).unwrap();
    binder.did_end_display_cell(cell, index);

    // Item callbacks run before the view's own lifecycle methods.
    assert_eq!(
        *log.lock(),
        vec!["render", "item-will", "cell-will", "item-end", "cell-end"]
    );
}

#[test]
fn test_header_renders_at_will_display() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let view_log = Arc::clone(&log);
    let callback_log = Arc::clone(&log);
    let header: Arc<dyn HeaderFooterDescriptor> = Arc::new(
        HeaderFooter::with_factory(
            "log-header",
            Arc::new(move || {
                Box::new(LogHeader {
                    log: Arc::clone(&view_log),
                }) as Box<dyn HeaderFooterView>
            }),
        )
        .with_size(Size::new(375.0, 30.0))
        .with_on_will_display(move |_| callback_log.lock().push("callback".into())),
    );
    let section = Arc::new(Section::with_items(vec![probe_item("row")]).with_header(header));
    binder.set_sections(&mut grid, vec![section]);

    // Acquisition alone paints nothing.
    binder.header_for(&mut grid, 0).unwrap();
    assert!(log.lock().is_empty());

    let view = grid.headers.get_mut(&0).unwrap().as_mut();
    binder.will_display_header(view, 0);
    assert_eq!(*log.lock(), vec!["render", "callback"]);
}

#[test]
fn test_selection_flow() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    let selected: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&selected);
    let tappable: Arc<dyn ItemDescriptor> = Arc::new(
        Item::new::<ProbeCell>()
            .with_data(Arc::new("tap me".to_string()))
            .with_on_select(move |item| {
                let text = item
                    .data()
                    .and_then(|data| data.downcast_ref::<String>().cloned())
                    .unwrap_or_default();
                captured.lock().push(text);
            }),
    );
    let inert: Arc<dyn ItemDescriptor> =
        Arc::new(Item::new::<ProbeCell>().with_should_select(false));
    binder.set_sections(&mut grid, single_section(vec![tappable, inert]));

    assert!(binder.should_select(ItemIndex::new(0, 0)));
    assert!(!binder.should_select(ItemIndex::new(0, 1)));

    binder.did_select(ItemIndex::new(0, 0));
    assert_eq!(*selected.lock(), vec!["tap me".to_string()]);
}

#[test]
fn test_measured_rows_resize_with_the_container() {
    let mut grid = MockGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    let row = Arc::new(RowItem::new::<ProbeCell>().with_measure(|width| width / 10.0));
    binder.set_sections(
        &mut grid,
        single_section(vec![row.clone() as Arc<dyn ItemDescriptor>]),
    );

    binder.update_layout(&mut grid, false);
    assert_eq!(
        binder.item_size(&grid, ItemIndex::new(0, 0)),
        Size::new(375.0, 37.5)
    );

    // A narrower container re-measures on the next layout pass.
    grid.container = Size::new(320.0, 812.0);
    binder.update_layout(&mut grid, true);
    assert_eq!(
        binder.item_size(&grid, ItemIndex::new(0, 0)),
        Size::new(320.0, 32.0)
    );
    assert_eq!(grid.reload_all_count, 1);
}
