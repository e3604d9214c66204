//! Item descriptors, one per cell on the surface.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cardstock_core::geometry::Size;
use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use crate::view::{CellFactory, CellView};

use super::row::ItemLayout;
use super::{ReloadHook, ReloadKind};

/// Callback carrying the descriptor that triggered it.
pub type ItemCallback = Arc<dyn Fn(&Arc<dyn ItemDescriptor>) + Send + Sync>;

/// The core trait for items bound to cells.
///
/// At minimum an implementation provides an intrinsic size, a view
/// factory, a reuse identifier, and a reload slot. Everything else
/// defaults: interaction flags allow selection and highlight, callbacks
/// and the payload are absent, and the reload slot stays empty until
/// the binder wires it.
pub trait ItemDescriptor: Send + Sync {
    /// The item's intrinsic size.
    ///
    /// Either dimension may be [`AUTOMATIC_WIDTH`](super::AUTOMATIC_WIDTH)
    /// or [`AUTOMATIC_HEIGHT`](super::AUTOMATIC_HEIGHT); the binder
    /// resolves those against the container at query time.
    fn size(&self) -> Size;

    /// The factory producing this item's cells.
    fn cell_factory(&self) -> CellFactory;

    /// The reuse identifier partitioning the host's cell pool.
    fn reuse_id(&self) -> String;

    /// Returns the installed reload hook, if any.
    fn reload_hook(&self) -> Option<ReloadHook>;

    /// Installs a reload hook.
    ///
    /// The binder only installs into an empty slot, so a hook set by
    /// the application before binding stays in place.
    fn set_reload_hook(&self, hook: Option<ReloadHook>);

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Whether the element may be selected.
    fn should_select(&self) -> bool {
        true
    }

    /// Whether the element may be deselected.
    fn should_deselect(&self) -> bool {
        true
    }

    /// Whether the element may enter the highlighted state.
    fn should_highlight(&self) -> bool {
        true
    }

    /// Application-facing hint that the content changed since the last
    /// paint.
    ///
    /// The binder renders unconditionally at acquisition and never
    /// consults this flag; it exists for application bookkeeping.
    fn needs_update(&self) -> bool {
        true
    }

    /// Updates the [`needs_update`](ItemDescriptor::needs_update) hint.
    fn set_needs_update(&self, _needs_update: bool) {}

    /// Arbitrary payload attached by the application.
    fn data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }

    /// Invoked when the element is selected.
    fn on_select(&self) -> Option<ItemCallback> {
        None
    }

    /// Invoked when the element is deselected.
    fn on_deselect(&self) -> Option<ItemCallback> {
        None
    }

    /// Invoked just before the element becomes visible.
    fn on_will_display(&self) -> Option<ItemCallback> {
        None
    }

    /// Invoked after the element leaves the visible region.
    fn on_did_end_display(&self) -> Option<ItemCallback> {
        None
    }

    /// Layout capability, for binders that push container geometry into
    /// items.
    fn as_item_layout(&self) -> Option<&dyn ItemLayout> {
        None
    }

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Requests a refresh of this item through the installed hook.
    ///
    /// A no-op until a hook is wired.
    fn reload(&self, kind: ReloadKind) {
        if let Some(hook) = self.reload_hook() {
            hook(kind);
        }
    }
}

/// Default [`ItemDescriptor`] implementation.
///
/// Every mutable field sits behind one mutex; accessors clone values
/// out so the lock is never held while caller code runs.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use cardstock::model::Item;
/// use cardstock_core::geometry::Size;
///
/// let item = Item::new::<BadgeCell>()
///     .with_size(Size::new(60.0, 44.0))
///     .with_on_select(|item| println!("selected {}", item.reuse_id()));
/// let item: Arc<dyn ItemDescriptor> = Arc::new(item);
/// ```
pub struct Item {
    reuse_id: String,
    factory: CellFactory,
    state: Mutex<ItemState>,
}

struct ItemState {
    size: Size,
    should_select: bool,
    should_deselect: bool,
    should_highlight: bool,
    needs_update: bool,
    data: Option<Arc<dyn Any + Send + Sync>>,
    reload_hook: Option<ReloadHook>,
    on_select: Option<ItemCallback>,
    on_deselect: Option<ItemCallback>,
    on_will_display: Option<ItemCallback>,
    on_did_end_display: Option<ItemCallback>,
}

impl ItemState {
    fn new() -> Self {
        Self {
            size: Size::ZERO,
            should_select: true,
            should_deselect: true,
            should_highlight: true,
            needs_update: true,
            data: None,
            reload_hook: None,
            on_select: None,
            on_deselect: None,
            on_will_display: None,
            on_did_end_display: None,
        }
    }
}

impl Item {
    /// Creates an item rendered by cells of type `V`.
    ///
    /// The reuse identifier defaults to the type name of `V`, so every
    /// cell type gets its own slice of the host pool without further
    /// configuration.
    pub fn new<V: CellView + Default + 'static>() -> Self {
        Self::with_factory(
            std::any::type_name::<V>(),
            Arc::new(|| Box::new(V::default()) as Box<dyn CellView>),
        )
    }

    /// Creates an item with an explicit reuse identifier and factory.
    pub fn with_factory(reuse_id: impl Into<String>, factory: CellFactory) -> Self {
        Self {
            reuse_id: reuse_id.into(),
            factory,
            state: Mutex::new(ItemState::new()),
        }
    }

    /// Sets the intrinsic size.
    pub fn with_size(self, size: Size) -> Self {
        self.set_size(size);
        self
    }

    /// Attaches an application payload.
    pub fn with_data(self, data: Arc<dyn Any + Send + Sync>) -> Self {
        self.set_data(Some(data));
        self
    }

    /// Sets whether the element may be selected.
    pub fn with_should_select(self, allowed: bool) -> Self {
        self.set_should_select(allowed);
        self
    }

    /// Sets whether the element may be deselected.
    pub fn with_should_deselect(self, allowed: bool) -> Self {
        self.set_should_deselect(allowed);
        self
    }

    /// Sets whether the element may highlight.
    pub fn with_should_highlight(self, allowed: bool) -> Self {
        self.set_should_highlight(allowed);
        self
    }

    /// Installs the selection callback.
    pub fn with_on_select(
        self,
        callback: impl Fn(&Arc<dyn ItemDescriptor>) + Send + Sync + 'static,
    ) -> Self {
        self.set_on_select(Some(Arc::new(callback)));
        self
    }

    /// Installs the deselection callback.
    pub fn with_on_deselect(
        self,
        callback: impl Fn(&Arc<dyn ItemDescriptor>) + Send + Sync + 'static,
    ) -> Self {
        self.set_on_deselect(Some(Arc::new(callback)));
        self
    }

    /// Installs the will-display callback.
    pub fn with_on_will_display(
        self,
        callback: impl Fn(&Arc<dyn ItemDescriptor>) + Send + Sync + 'static,
    ) -> Self {
        self.set_on_will_display(Some(Arc::new(callback)));
        self
    }

    /// Installs the did-end-display callback.
    pub fn with_on_did_end_display(
        self,
        callback: impl Fn(&Arc<dyn ItemDescriptor>) + Send + Sync + 'static,
    ) -> Self {
        self.set_on_did_end_display(Some(Arc::new(callback)));
        self
    }

    /// Updates the intrinsic size. Call [`reload`](ItemDescriptor::reload)
    /// to surface the change.
    pub fn set_size(&self, size: Size) {
        self.state.lock().size = size;
    }

    /// Replaces the application payload.
    pub fn set_data(&self, data: Option<Arc<dyn Any + Send + Sync>>) {
        self.state.lock().data = data;
    }

    pub fn set_should_select(&self, allowed: bool) {
        self.state.lock().should_select = allowed;
    }

    pub fn set_should_deselect(&self, allowed: bool) {
        self.state.lock().should_deselect = allowed;
    }

    pub fn set_should_highlight(&self, allowed: bool) {
        self.state.lock().should_highlight = allowed;
    }

    pub fn set_on_select(&self, callback: Option<ItemCallback>) {
        self.state.lock().on_select = callback;
    }

    pub fn set_on_deselect(&self, callback: Option<ItemCallback>) {
        self.state.lock().on_deselect = callback;
    }

    pub fn set_on_will_display(&self, callback: Option<ItemCallback>) {
        self.state.lock().on_will_display = callback;
    }

    pub fn set_on_did_end_display(&self, callback: Option<ItemCallback>) {
        self.state.lock().on_did_end_display = callback;
    }
}

impl ItemDescriptor for Item {
    fn size(&self) -> Size {
        self.state.lock().size
    }

    fn cell_factory(&self) -> CellFactory {
        Arc::clone(&self.factory)
    }

    fn reuse_id(&self) -> String {
        self.reuse_id.clone()
    }

    fn reload_hook(&self) -> Option<ReloadHook> {
        self.state.lock().reload_hook.clone()
    }

    fn set_reload_hook(&self, hook: Option<ReloadHook>) {
        self.state.lock().reload_hook = hook;
    }

    fn should_select(&self) -> bool {
        self.state.lock().should_select
    }

    fn should_deselect(&self) -> bool {
        self.state.lock().should_deselect
    }

    fn should_highlight(&self) -> bool {
        self.state.lock().should_highlight
    }

    fn needs_update(&self) -> bool {
        self.state.lock().needs_update
    }

    fn set_needs_update(&self, needs_update: bool) {
        self.state.lock().needs_update = needs_update;
    }

    fn data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.state.lock().data.clone()
    }

    fn on_select(&self) -> Option<ItemCallback> {
        self.state.lock().on_select.clone()
    }

    fn on_deselect(&self) -> Option<ItemCallback> {
        self.state.lock().on_deselect.clone()
    }

    fn on_will_display(&self) -> Option<ItemCallback> {
        self.state.lock().on_will_display.clone()
    }

    fn on_did_end_display(&self) -> Option<ItemCallback> {
        self.state.lock().on_did_end_display.clone()
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Item")
            .field("reuse_id", &self.reuse_id)
            .field("size", &state.size)
            .field("needs_update", &state.needs_update)
            .finish_non_exhaustive()
    }
}

assert_impl_all!(Item: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct PlainCell;

    impl CellView for PlainCell {
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_item_reuse_id_defaults_to_type_name() {
        let item = Item::new::<PlainCell>();
        assert!(item.reuse_id().ends_with("PlainCell"));
    }

    #[test]
    fn test_item_defaults() {
        let item = Item::new::<PlainCell>();
        assert_eq!(item.size(), Size::ZERO);
        assert!(item.should_select());
        assert!(item.should_deselect());
        assert!(item.should_highlight());
        assert!(item.needs_update());
        assert!(item.data().is_none());
        assert!(item.reload_hook().is_none());
        assert!(item.as_item_layout().is_none());
    }

    #[test]
    fn test_reload_routes_through_hook() {
        let item = Item::new::<PlainCell>();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let captured = Arc::clone(&seen);
        item.set_reload_hook(Some(Arc::new(move |kind| {
            captured.lock().push(kind);
        })));

        item.reload(ReloadKind::Rerender);
        item.reload(ReloadKind::ReloadAll);

        assert_eq!(
            *seen.lock(),
            vec![ReloadKind::Rerender, ReloadKind::ReloadAll]
        );
    }

    #[test]
    fn test_reload_without_hook_is_noop() {
        let item = Item::new::<PlainCell>();
        item.reload(ReloadKind::Reload);
    }

    #[test]
    fn test_selection_callback_receives_descriptor() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let item: Arc<dyn ItemDescriptor> = Arc::new(
            Item::new::<PlainCell>().with_on_select(move |item| {
                captured.lock().push(item.reuse_id());
            }),
        );

        if let Some(callback) = item.on_select() {
            callback(&item);
        }
        assert_eq!(seen.lock().len(), 1);
        assert!(seen.lock()[0].ends_with("PlainCell"));
    }

    #[test]
    fn test_factory_produces_fresh_cells() {
        let item = Item::new::<PlainCell>();
        let factory = item.cell_factory();
        let mut a = factory();
        let mut b = factory();
        assert!(!std::ptr::eq(
            a.as_any_mut() as *const dyn Any,
            b.as_any_mut() as *const dyn Any
        ));
    }
}
