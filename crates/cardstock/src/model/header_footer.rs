//! Header and footer descriptors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cardstock_core::geometry::Size;
use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use crate::view::{HeaderFooterFactory, HeaderFooterView};

use super::row::ContentLayout;
use super::{ReloadHook, ReloadKind};

/// Callback carrying the descriptor that triggered it.
pub type HeaderFooterCallback = Arc<dyn Fn(&Arc<dyn HeaderFooterDescriptor>) + Send + Sync>;

/// The core trait for section headers and footers.
///
/// Only the extent along the scroll axis participates in layout; the
/// cross axis always spans the container.
pub trait HeaderFooterDescriptor: Send + Sync {
    /// The intrinsic size. A zero extent along the scroll axis means
    /// the slot is laid out empty.
    fn size(&self) -> Size;

    /// The factory producing this descriptor's views.
    fn view_factory(&self) -> HeaderFooterFactory;

    /// The reuse identifier partitioning the host's supplementary pool.
    fn reuse_id(&self) -> String;

    /// Returns the installed reload hook, if any.
    fn reload_hook(&self) -> Option<ReloadHook>;

    /// Installs a reload hook. The binder only installs into an empty
    /// slot.
    fn set_reload_hook(&self, hook: Option<ReloadHook>);

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Application-facing hint that the content changed since the last
    /// paint.
    fn needs_update(&self) -> bool {
        true
    }

    /// Updates the [`needs_update`](HeaderFooterDescriptor::needs_update)
    /// hint.
    fn set_needs_update(&self, _needs_update: bool) {}

    /// Arbitrary payload attached by the application.
    fn data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }

    /// Invoked just before the view becomes visible.
    fn on_will_display(&self) -> Option<HeaderFooterCallback> {
        None
    }

    /// Invoked after the view leaves the visible region.
    fn on_did_end_display(&self) -> Option<HeaderFooterCallback> {
        None
    }

    /// Layout capability, for binders that push container geometry into
    /// headers and footers.
    fn as_content_layout(&self) -> Option<&dyn ContentLayout> {
        None
    }

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Requests a refresh through the installed hook.
    ///
    /// A no-op until a hook is wired.
    fn reload(&self, kind: ReloadKind) {
        if let Some(hook) = self.reload_hook() {
            hook(kind);
        }
    }
}

/// Default [`HeaderFooterDescriptor`] implementation.
pub struct HeaderFooter {
    reuse_id: String,
    factory: HeaderFooterFactory,
    state: Mutex<HeaderFooterState>,
}

struct HeaderFooterState {
    size: Size,
    needs_update: bool,
    data: Option<Arc<dyn Any + Send + Sync>>,
    reload_hook: Option<ReloadHook>,
    on_will_display: Option<HeaderFooterCallback>,
    on_did_end_display: Option<HeaderFooterCallback>,
}

impl HeaderFooter {
    /// Creates a descriptor rendered by views of type `V`, with the
    /// type name as the reuse identifier.
    pub fn new<V: HeaderFooterView + Default + 'static>() -> Self {
        Self::with_factory(
            std::any::type_name::<V>(),
            Arc::new(|| Box::new(V::default()) as Box<dyn HeaderFooterView>),
        )
    }

    /// Creates a descriptor with an explicit reuse identifier and
    /// factory.
    pub fn with_factory(reuse_id: impl Into<String>, factory: HeaderFooterFactory) -> Self {
        Self {
            reuse_id: reuse_id.into(),
            factory,
            state: Mutex::new(HeaderFooterState {
                size: Size::ZERO,
                needs_update: true,
                data: None,
                reload_hook: None,
                on_will_display: None,
                on_did_end_display: None,
            }),
        }
    }

    /// Sets the intrinsic size.
    pub fn with_size(self, size: Size) -> Self {
        self.set_size(size);
        self
    }

    /// Attaches an application payload.
    pub fn with_data(self, data: Arc<dyn Any + Send + Sync>) -> Self {
        self.state.lock().data = Some(data);
        self
    }

    /// Installs the will-display callback.
    pub fn with_on_will_display(
        self,
        callback: impl Fn(&Arc<dyn HeaderFooterDescriptor>) + Send + Sync + 'static,
    ) -> Self {
        self.state.lock().on_will_display = Some(Arc::new(callback));
        self
    }

    /// Installs the did-end-display callback.
    pub fn with_on_did_end_display(
        self,
        callback: impl Fn(&Arc<dyn HeaderFooterDescriptor>) + Send + Sync + 'static,
    ) -> Self {
        self.state.lock().on_did_end_display = Some(Arc::new(callback));
        self
    }

    /// Updates the intrinsic size. Call
    /// [`reload`](HeaderFooterDescriptor::reload) to surface the change.
    pub fn set_size(&self, size: Size) {
        self.state.lock().size = size;
    }
}

impl HeaderFooterDescriptor for HeaderFooter {
    fn size(&self) -> Size {
        self.state.lock().size
    }

    fn view_factory(&self) -> HeaderFooterFactory {
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

    fn needs_update(&self) -> bool {
        self.state.lock().needs_update
    }

    fn set_needs_update(&self, needs_update: bool) {
        self.state.lock().needs_update = needs_update;
    }

    fn data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.state.lock().data.clone()
    }

    fn on_will_display(&self) -> Option<HeaderFooterCallback> {
        self.state.lock().on_will_display.clone()
    }

    fn on_did_end_display(&self) -> Option<HeaderFooterCallback> {
        self.state.lock().on_did_end_display.clone()
    }
}

impl fmt::Debug for HeaderFooter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("HeaderFooter")
            .field("reuse_id", &self.reuse_id)
            .field("size", &state.size)
            .finish_non_exhaustive()
    }
}

assert_impl_all!(HeaderFooter: Send, Sync);
