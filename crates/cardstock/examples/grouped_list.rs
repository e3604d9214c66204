//! Grouped settings-list example.
//!
//! Builds a two-section list, binds it to a minimal in-memory host,
//! runs an inset-grouped layout pass, and walks one debounced update
//! cycle end to end.
//!
//! Run with: cargo run -p cardstock --example grouped_list

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cardstock::{
    AUTOMATIC_WIDTH, Axis, CellFactory, CellView, Color, DEFAULT_DEBOUNCE, EdgeInsets, GridBinder,
    GridHost, GroupAppearance, GroupStyle, GroupedFlowLayout, HeaderFooter,
    HeaderFooterDescriptor, HeaderFooterFactory, HeaderFooterView, HostId, Item, ItemDescriptor,
    ItemIndex, ReloadKind, RowItem, Section, Size,
};

/// A cell that shows one line of text.
#[derive(Default)]
struct TextCell {
    text: String,
}

impl CellView for TextCell {
    fn render(&mut self, item: &Arc<dyn ItemDescriptor>) {
        if let Some(data) = item.data() {
            if let Some(text) = data.downcast_ref::<String>() {
                self.text = text.clone();
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct TitleView {
    title: String,
}

impl HeaderFooterView for TitleView {
    fn render(&mut self, header_footer: &Arc<dyn HeaderFooterDescriptor>) {
        if let Some(data) = header_footer.data() {
            if let Some(text) = data.downcast_ref::<String>() {
                self.title = text.clone();
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A tiny in-memory stand-in for a grid widget. It keeps dequeued
/// views keyed by position and prints every refresh command.
struct MiniGrid {
    id: HostId,
    container: Size,
    cell_factories: HashMap<String, CellFactory>,
    header_factories: HashMap<String, HeaderFooterFactory>,
    visible: HashMap<ItemIndex, Box<dyn CellView>>,
    headers: HashMap<usize, Box<dyn HeaderFooterView>>,
}

impl MiniGrid {
    fn new(container: Size) -> Self {
        Self {
            id: HostId::next(),
            container,
            cell_factories: HashMap::new(),
            header_factories: HashMap::new(),
            visible: HashMap::new(),
            headers: HashMap::new(),
        }
    }
}

impl GridHost for MiniGrid {
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

    fn register_footer(&mut self, _reuse_id: &str, _factory: HeaderFooterFactory) {}

    fn acquire_cell(&mut self, reuse_id: &str, index: ItemIndex) -> Option<&mut dyn CellView> {
        let factory = self.cell_factories.get(reuse_id)?;
        let cell = factory();
        self.visible.insert(index, cell);
        Some(self.visible.get_mut(&index).expect("just inserted").as_mut())
    }

    fn acquire_header(
        &mut self,
        reuse_id: &str,
        section: usize,
    ) -> Option<&mut dyn HeaderFooterView> {
        let factory = self.header_factories.get(reuse_id)?;
        let view = factory();
        self.headers.insert(section, view);
        Some(self.headers.get_mut(&section).expect("just inserted").as_mut())
    }

    fn acquire_footer(
        &mut self,
        _reuse_id: &str,
        _section: usize,
    ) -> Option<&mut dyn HeaderFooterView> {
        None
    }

    fn visible_cell(&mut self, index: ItemIndex) -> Option<&mut dyn CellView> {
        Some(self.visible.get_mut(&index)?.as_mut())
    }

    fn reload_all(&mut self) {
        println!("  [host] reload all");
    }

    fn reload_sections(&mut self, sections: &BTreeSet<usize>) {
        println!("  [host] reload sections {sections:?}");
    }

    fn reload_cells(&mut self, indices: &[ItemIndex]) {
        let positions: Vec<String> = indices.iter().map(|index| index.to_string()).collect();
        println!("  [host] reload cells {}", positions.join(", "));
    }

    fn insert_cells(&mut self, indices: &[ItemIndex]) {
        let positions: Vec<String> = indices.iter().map(|index| index.to_string()).collect();
        println!("  [host] insert cells {}", positions.join(", "));
    }

    fn set_placeholder_visible(&mut self, visible: bool) {
        if visible {
            println!("  [host] showing empty placeholder");
        }
    }
}

struct SettingsStyle;

impl GroupStyle for SettingsStyle {
    fn corner_radius(&self, _section: usize) -> f32 {
        12.0
    }

    fn background(&self, _section: usize) -> Option<Color> {
        Some(Color::WHITE)
    }
}

fn toggle_row(title: &str, value: &str) -> Arc<RowItem> {
    Arc::new(
        RowItem::new::<TextCell>()
            .with_height(44.0)
            .with_data(Arc::new(format!("{title}: {value}")))
            .with_on_select(|item| {
                if let Some(data) = item.data() {
                    if let Some(text) = data.downcast_ref::<String>() {
                        println!("  selected \"{text}\"");
                    }
                }
            }),
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cardstock=debug")),
        )
        .init();

    println!("Grouped list example");
    println!("====================");
    println!();

    let mut grid = MiniGrid::new(Size::new(375.0, 812.0));
    let mut binder = GridBinder::new();

    // Section one: toggle rows under a header.
    let wifi = toggle_row("Wi-Fi", "Off");
    let general_rows: Vec<Arc<dyn ItemDescriptor>> = vec![
        toggle_row("Airplane Mode", "Off") as Arc<dyn ItemDescriptor>,
        wifi.clone() as Arc<dyn ItemDescriptor>,
        toggle_row("Bluetooth", "On") as Arc<dyn ItemDescriptor>,
    ];
    let header: Arc<dyn HeaderFooterDescriptor> = Arc::new(
        HeaderFooter::new::<TitleView>()
            .with_size(Size::new(375.0, 28.0))
            .with_data(Arc::new("GENERAL".to_string())),
    );
    let general = Arc::new(
        Section::with_items(general_rows)
            .with_header(header)
            .with_inset(EdgeInsets::new(8.0, 16.0, 8.0, 16.0)),
    );

    // Section two: fixed-height detail rows with automatic width.
    let about_rows: Vec<Arc<dyn ItemDescriptor>> = ["Version 4.2.1", "Model XK-550"]
        .iter()
        .map(|line| {
            Arc::new(
                Item::new::<TextCell>()
                    .with_size(Size::new(AUTOMATIC_WIDTH, 52.0))
                    .with_data(Arc::new(line.to_string())),
            ) as Arc<dyn ItemDescriptor>
        })
        .collect();
    let about = Arc::new(
        Section::with_items(about_rows).with_inset(EdgeInsets::new(8.0, 16.0, 8.0, 16.0)),
    );

    binder.set_sections(&mut grid, vec![general, about]);
    binder.update_layout(&mut grid, false);

    // A display pass: the host queries counts, then dequeues cells.
    println!("Display pass");
    println!("------------");
    let sections = binder.section_count(&mut grid);
    for section in 0..sections {
        for item in 0..binder.item_count(section) {
            let index = ItemIndex::new(section, item);
            let cell = binder.cell_for(&mut grid, index).expect("cell registered");
            let text = &cell
                .as_any_mut()
                .downcast_mut::<TextCell>()
                .expect("text cell")
                .text;
            println!("  {index} {text}");
        }
    }

    // Supplementary views render when they come on screen.
    let view = binder.header_for(&mut grid, 0).expect("header registered");
    binder.will_display_header(view, 0);
    let title = grid
        .headers
        .get_mut(&0)
        .expect("header on screen")
        .as_any_mut()
        .downcast_mut::<TitleView>()
        .expect("title view");
    println!("  header \"{}\"", title.title);
    println!();

    // Card layout: each section gets a rounded card behind its rows.
    println!("Inset grouped layout");
    println!("--------------------");
    let mut layout =
        GroupedFlowLayout::with_appearance(Axis::Vertical, GroupAppearance::InsetGrouped);
    layout.set_style(Arc::new(SettingsStyle));
    layout.set_container_size(grid.container_size());
    layout.prepare(&binder.flow_source(&grid));

    let content = layout.content_size();
    println!("  content size {}x{}", content.width, content.height);
    for (section, card) in layout.decorations() {
        println!(
            "  section {section} card at ({}, {}) {}x{} radius {}",
            card.frame.left(),
            card.frame.top(),
            card.frame.width(),
            card.frame.height(),
            card.corner_radius,
        );
    }
    println!();

    // Selection routes to the item's own callback.
    println!("Selection");
    println!("---------");
    binder.did_select(ItemIndex::new(0, 1));
    println!();

    // A content-only change repaints the visible cell in place once
    // the quiet window elapses.
    println!("Debounced repaint");
    println!("-----------------");
    wifi.set_data(Some(Arc::new("Wi-Fi: Connected".to_string())));
    wifi.reload(ReloadKind::Rerender);
    println!(
        "  flush due in {:?}",
        binder.time_until_flush(Instant::now()).unwrap_or_default()
    );
    thread::sleep(DEFAULT_DEBOUNCE + Duration::from_millis(20));
    let applied = binder.flush_updates(&mut grid, Instant::now());
    println!("  applied: {applied}");

    let refreshed = grid
        .visible_cell(ItemIndex::new(0, 1))
        .expect("wifi cell on screen")
        .as_any_mut()
        .downcast_mut::<TextCell>()
        .expect("text cell");
    println!("  wifi row now reads \"{}\"", refreshed.text);
    println!();

    // A structural change routes through the host's reload pipeline.
    println!("Debounced section reload");
    println!("------------------------");
    binder
        .section_at(1)
        .expect("about section")
        .reload(ReloadKind::Reload);
    thread::sleep(DEFAULT_DEBOUNCE + Duration::from_millis(20));
    binder.flush_updates(&mut grid, Instant::now());

    println!();
    println!("Done.");
}
