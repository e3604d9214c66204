//! Debounced coalescing of refresh requests.
//!
//! Bursts of `reload` calls within one quiet window collapse into a
//! single batch, and the batch always carries exactly one category of
//! work. When a window mixes categories, or asks for too many per-item
//! reloads, the whole thing escalates to a full reload: one predictable
//! refresh beats a pile of overlapping partial ones.

use std::collections::BTreeSet;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cardstock_core::debounce::Debouncer;
use cardstock_core::thread_check::ThreadAffinity;
use parking_lot::Mutex;
use static_assertions::assert_impl_all;
use tracing::{debug, trace};

use crate::model::{ItemDescriptor, ItemIndex, ReloadKind};

/// Default quiet period before a flush.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Limit past which per-item reloads escalate to a full reload.
const MAX_ITEM_RELOADS: usize = 5;

/// One coalesced batch, ready to apply. Exactly one category per flush.
pub enum UpdateBatch {
    /// Refresh the whole surface.
    ReloadAll,
    /// Structurally reload whole sections.
    ReloadSections(BTreeSet<usize>),
    /// Reload or repaint individual items, deduplicated by identity.
    ReloadItems(Vec<(Arc<dyn ItemDescriptor>, ReloadKind)>),
    /// Insert new elements at the given positions.
    InsertItems(Vec<ItemIndex>),
}

impl fmt::Debug for UpdateBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReloadAll => f.write_str("ReloadAll"),
            Self::ReloadSections(sections) => {
                f.debug_tuple("ReloadSections").field(sections).finish()
            }
            Self::ReloadItems(items) => write!(f, "ReloadItems({} items)", items.len()),
            Self::InsertItems(indices) => f.debug_tuple("InsertItems").field(indices).finish(),
        }
    }
}

struct Pending {
    reload_all: bool,
    sections: BTreeSet<usize>,
    items: Vec<(Arc<dyn ItemDescriptor>, ReloadKind)>,
    inserts: Vec<ItemIndex>,
    debounce: Debouncer,
    stopped: bool,
}

/// Debounces and coalesces refresh requests against a live surface.
///
/// Enqueue operations restart the quiet window; the owner pumps
/// [`flush_due`](Reconciler::flush_due) from its control timeline and
/// applies the returned batch. All operations must happen on the thread
/// that created the reconciler.
pub struct Reconciler {
    state: Mutex<Pending>,
    affinity: ThreadAffinity,
}

impl Reconciler {
    /// Creates a reconciler with the default 50 ms window.
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_DEBOUNCE)
    }

    /// Creates a reconciler with a custom quiet window.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            state: Mutex::new(Pending {
                reload_all: false,
                sections: BTreeSet::new(),
                items: Vec::new(),
                inserts: Vec::new(),
                debounce: Debouncer::new(interval),
                stopped: false,
            }),
            affinity: ThreadAffinity::current(),
        }
    }

    /// Requests a refresh of the whole surface.
    pub fn reload_all(&self) {
        self.affinity.debug_assert_same_thread();
        let mut state = self.state.lock();
        if state.stopped {
            return;
        }
        state.reload_all = true;
        state.debounce.restart(Instant::now());
    }

    /// Requests a structural reload of the given sections.
    ///
    /// Empty input is dropped without touching the quiet window.
    pub fn reload_sections<I>(&self, sections: I)
    where
        I: IntoIterator<Item = usize>,
    {
        self.affinity.debug_assert_same_thread();
        let requested: BTreeSet<usize> = sections.into_iter().collect();
        if requested.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        if state.stopped {
            return;
        }
        state.sections.extend(requested);
        state.debounce.restart(Instant::now());
    }

    /// Requests a refresh of one item.
    ///
    /// [`ReloadKind::ReloadAll`] routes to a whole-surface reload.
    pub fn reload_item(&self, item: &Arc<dyn ItemDescriptor>, kind: ReloadKind) {
        if kind == ReloadKind::ReloadAll {
            self.reload_all();
            return;
        }
        self.affinity.debug_assert_same_thread();
        let mut state = self.state.lock();
        if state.stopped {
            return;
        }
        state.items.push((Arc::clone(item), kind));
        state.debounce.restart(Instant::now());
    }

    /// Requests a refresh of several items with one kind.
    pub fn reload_items(&self, items: &[Arc<dyn ItemDescriptor>], kind: ReloadKind) {
        if items.is_empty() {
            return;
        }
        if kind == ReloadKind::ReloadAll {
            self.reload_all();
            return;
        }
        self.affinity.debug_assert_same_thread();
        let mut state = self.state.lock();
        if state.stopped {
            return;
        }
        state
            .items
            .extend(items.iter().map(|item| (Arc::clone(item), kind)));
        state.debounce.restart(Instant::now());
    }

    /// Requests insertion of elements at the given positions.
    ///
    /// Empty input is dropped without touching the quiet window.
    pub fn insert_items(&self, indices: &[ItemIndex]) {
        if indices.is_empty() {
            return;
        }
        self.affinity.debug_assert_same_thread();
        let mut state = self.state.lock();
        if state.stopped {
            return;
        }
        state.inserts.extend_from_slice(indices);
        state.debounce.restart(Instant::now());
    }

    /// Whether any request is waiting on the quiet window.
    pub fn has_pending(&self) -> bool {
        self.state.lock().debounce.is_pending()
    }

    /// Time until the pending window elapses; `None` while idle.
    pub fn time_until_flush(&self, now: Instant) -> Option<Duration> {
        self.state.lock().debounce.time_until_fire(now)
    }

    /// Coalesces and returns the next batch once the quiet window has
    /// elapsed; `None` while idle or still inside the window.
    pub fn flush_due(&self, now: Instant) -> Option<UpdateBatch> {
        self.affinity.debug_assert_same_thread();
        let (mut reload_all, sections, items, inserts) = {
            let mut state = self.state.lock();
            if !state.debounce.fire_if_due(now) {
                return None;
            }
            (
                mem::take(&mut state.reload_all),
                mem::take(&mut state.sections),
                mem::take(&mut state.items),
                mem::take(&mut state.inserts),
            )
        };

        // Identity dedup; the heavier kind wins for repeated items.
        let mut deduped: Vec<(Arc<dyn ItemDescriptor>, ReloadKind)> =
            Vec::with_capacity(items.len());
        for (item, kind) in items {
            match deduped
                .iter_mut()
                .find(|(seen, _)| Arc::ptr_eq(seen, &item))
            {
                Some(existing) => existing.1 = existing.1.max(kind),
                None => deduped.push((item, kind)),
            }
        }

        let mut unique_inserts: Vec<ItemIndex> = Vec::with_capacity(inserts.len());
        for index in inserts {
            if !unique_inserts.contains(&index) {
                unique_inserts.push(index);
            }
        }

        if !reload_all && deduped.len() > MAX_ITEM_RELOADS {
            debug!(
                target: "cardstock::reconcile",
                items = deduped.len(),
                "item reloads exceed limit, escalating to a full reload"
            );
            reload_all = true;
        }
        if !reload_all {
            let categories = [
                !sections.is_empty(),
                !deduped.is_empty(),
                !unique_inserts.is_empty(),
            ]
            .into_iter()
            .filter(|present| *present)
            .count();
            if categories > 1 {
                debug!(
                    target: "cardstock::reconcile",
                    "mixed update categories in one window, escalating to a full reload"
                );
                reload_all = true;
            }
        }

        let batch = if reload_all {
            Some(UpdateBatch::ReloadAll)
        } else if !sections.is_empty() {
            Some(UpdateBatch::ReloadSections(sections))
        } else if !deduped.is_empty() {
            Some(UpdateBatch::ReloadItems(deduped))
        } else if !unique_inserts.is_empty() {
            Some(UpdateBatch::InsertItems(unique_inserts))
        } else {
            None
        };
        if let Some(batch) = &batch {
            trace!(target: "cardstock::reconcile", ?batch, "flushing");
        }
        batch
    }

    /// Drops pending work and ignores every future request.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.stopped = true;
        state.reload_all = false;
        state.sections.clear();
        state.items.clear();
        state.inserts.clear();
        state.debounce.cancel();
        trace!(target: "cardstock::reconcile", "stopped");
    }

    /// Whether [`stop`](Reconciler::stop) has run.
    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Reconciler")
            .field("reload_all", &state.reload_all)
            .field("sections", &state.sections.len())
            .field("items", &state.items.len())
            .field("inserts", &state.inserts.len())
            .field("stopped", &state.stopped)
            .finish_non_exhaustive()
    }
}

assert_impl_all!(Reconciler: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    use crate::model::Item;
    use crate::view::CellView;

    #[derive(Default)]
    struct PlainCell;

    impl CellView for PlainCell {
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn item() -> Arc<dyn ItemDescriptor> {
        Arc::new(Item::new::<PlainCell>())
    }

    fn after_window() -> Instant {
        Instant::now() + Duration::from_millis(60)
    }

    #[test]
    fn test_reconciler_idle_flush_is_none() {
        let reconciler = Reconciler::new();
        assert!(!reconciler.has_pending());
        assert!(reconciler.flush_due(after_window()).is_none());
    }

    #[test]
    fn test_reconciler_flush_waits_for_window() {
        let reconciler = Reconciler::new();
        reconciler.reload_all();

        assert!(reconciler.flush_due(Instant::now()).is_none());
        assert!(matches!(
            reconciler.flush_due(after_window()),
            Some(UpdateBatch::ReloadAll)
        ));
        // The queue drained; nothing fires twice.
        assert!(reconciler.flush_due(after_window()).is_none());
    }

    #[test]
    fn test_reconciler_empty_inputs_do_not_arm_the_window() {
        let reconciler = Reconciler::new();
        reconciler.reload_sections(Vec::new());
        reconciler.insert_items(&[]);
        reconciler.reload_items(&[], ReloadKind::Reload);

        assert!(!reconciler.has_pending());
    }

    #[test]
    fn test_reconciler_stop_drops_pending_and_future_work() {
        let reconciler = Reconciler::new();
        reconciler.reload_all();
        reconciler.stop();

        assert!(reconciler.is_stopped());
        assert!(reconciler.flush_due(after_window()).is_none());

        reconciler.reload_sections([0]);
        assert!(!reconciler.has_pending());
        assert!(reconciler.flush_due(after_window()).is_none());
    }

    #[test]
    fn test_reconciler_item_reload_all_routes_to_full_reload() {
        let reconciler = Reconciler::new();
        reconciler.reload_item(&item(), ReloadKind::ReloadAll);

        assert!(matches!(
            reconciler.flush_due(after_window()),
            Some(UpdateBatch::ReloadAll)
        ));
    }

    #[test]
    fn test_reconciler_section_requests_union() {
        let reconciler = Reconciler::new();
        reconciler.reload_sections([0, 1]);
        reconciler.reload_sections([1, 2]);

        match reconciler.flush_due(after_window()) {
            Some(UpdateBatch::ReloadSections(sections)) => {
                assert_eq!(sections, BTreeSet::from([0, 1, 2]));
            }
            other => panic!("expected section batch, got {other:?}"),
        }
    }

    #[test]
    fn test_reconciler_repeated_item_collapses_to_heaviest_kind() {
        let reconciler = Reconciler::new();
        let a = item();
        reconciler.reload_item(&a, ReloadKind::Rerender);
        reconciler.reload_item(&a, ReloadKind::Reload);
        reconciler.reload_item(&a, ReloadKind::Rerender);

        match reconciler.flush_due(after_window()) {
            Some(UpdateBatch::ReloadItems(items)) => {
                assert_eq!(items.len(), 1);
                assert!(Arc::ptr_eq(&items[0].0, &a));
                assert_eq!(items[0].1, ReloadKind::Reload);
            }
            other => panic!("expected item batch, got {other:?}"),
        }
    }

    #[test]
    fn test_reconciler_escalates_past_item_limit() {
        let reconciler = Reconciler::new();
        let items: Vec<_> = (0..6).map(|_| item()).collect();
        reconciler.reload_items(&items, ReloadKind::Rerender);

        assert!(matches!(
            reconciler.flush_due(after_window()),
            Some(UpdateBatch::ReloadAll)
        ));
    }

    #[test]
    fn test_reconciler_five_items_stay_granular() {
        let reconciler = Reconciler::new();
        let items: Vec<_> = (0..5).map(|_| item()).collect();
        reconciler.reload_items(&items, ReloadKind::Reload);

        match reconciler.flush_due(after_window()) {
            Some(UpdateBatch::ReloadItems(batch)) => assert_eq!(batch.len(), 5),
            other => panic!("expected item batch, got {other:?}"),
        }
    }

    #[test]
    fn test_reconciler_mixed_categories_escalate() {
        let reconciler = Reconciler::new();
        reconciler.reload_sections([0]);
        reconciler.insert_items(&[ItemIndex::new(0, 0)]);

        assert!(matches!(
            reconciler.flush_due(after_window()),
            Some(UpdateBatch::ReloadAll)
        ));
    }

    #[test]
    fn test_reconciler_deduplicates_insert_positions() {
        let reconciler = Reconciler::new();
        reconciler.insert_items(&[ItemIndex::new(0, 1), ItemIndex::new(0, 1), ItemIndex::new(0, 2)]);

        match reconciler.flush_due(after_window()) {
            Some(UpdateBatch::InsertItems(indices)) => {
                assert_eq!(indices, vec![ItemIndex::new(0, 1), ItemIndex::new(0, 2)]);
            }
            other => panic!("expected insert batch, got {other:?}"),
        }
    }

    #[test]
    fn test_reconciler_full_reload_wins_over_everything() {
        let reconciler = Reconciler::new();
        reconciler.reload_sections([3]);
        reconciler.reload_all();

        assert!(matches!(
            reconciler.flush_due(after_window()),
            Some(UpdateBatch::ReloadAll)
        ));
    }
}
