//! Tests for update reconciliation and debounce timing.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cardstock::{
    CellView, DEFAULT_DEBOUNCE, Item, ItemDescriptor, ItemIndex, Reconciler, ReloadKind,
    UpdateBatch,
};

#[derive(Default)]
struct NullCell;

impl CellView for NullCell {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn item() -> Arc<dyn ItemDescriptor> {
    Arc::new(Item::new::<NullCell>())
}

/// An instant safely past the quiet window of anything enqueued now.
fn after_window() -> Instant {
    Instant::now() + DEFAULT_DEBOUNCE + Duration::from_millis(10)
}

#[test]
fn test_custom_interval_controls_flush_timing() {
    let reconciler = Reconciler::with_interval(Duration::from_millis(5));
    let start = Instant::now();
    reconciler.reload_sections([0]);

    assert!(reconciler.flush_due(start).is_none());
    assert!(reconciler.time_until_flush(start).is_some());

    let batch = reconciler.flush_due(start + Duration::from_millis(20));
    assert!(matches!(batch, Some(UpdateBatch::ReloadSections(_))));
}

#[test]
fn test_new_activity_extends_the_quiet_window() {
    let reconciler = Reconciler::new();
    let start = Instant::now();
    reconciler.reload_sections([0]);

    // A second request partway through pushes the deadline out.
    std::thread::sleep(Duration::from_millis(30));
    reconciler.reload_sections([1]);

    assert!(reconciler.flush_due(start + Duration::from_millis(55)).is_none());

    let batch = reconciler.flush_due(start + Duration::from_millis(400));
    match batch {
        Some(UpdateBatch::ReloadSections(sections)) => {
            assert_eq!(sections.into_iter().collect::<Vec<_>>(), vec![0, 1]);
        }
        other => panic!("expected a section batch, got {other:?}"),
    }
}

#[test]
fn test_flush_drains_and_rearms_for_next_burst() {
    let reconciler = Reconciler::new();

    reconciler.reload_sections([3]);
    assert!(reconciler.flush_due(after_window()).is_some());
    assert!(!reconciler.has_pending());
    assert!(reconciler.flush_due(after_window()).is_none());

    // The reconciler keeps working after a flush.
    reconciler.insert_items(&[ItemIndex::new(0, 2)]);
    let batch = reconciler.flush_due(after_window());
    assert!(matches!(batch, Some(UpdateBatch::InsertItems(_))));
}

#[test]
fn test_mixed_item_and_insert_requests_escalate() {
    let reconciler = Reconciler::new();

    reconciler.reload_item(&item(), ReloadKind::Rerender);
    reconciler.insert_items(&[ItemIndex::new(0, 0)]);

    assert!(matches!(
        reconciler.flush_due(after_window()),
        Some(UpdateBatch::ReloadAll)
    ));
}

#[test]
fn test_item_merge_prefers_reload_in_either_order() {
    for kinds in [
        [ReloadKind::Rerender, ReloadKind::Reload],
        [ReloadKind::Reload, ReloadKind::Rerender],
    ] {
        let reconciler = Reconciler::new();
        let shared = item();
        for kind in kinds {
            reconciler.reload_item(&shared, kind);
        }

        match reconciler.flush_due(after_window()) {
            Some(UpdateBatch::ReloadItems(items)) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].1, ReloadKind::Reload);
                assert!(Arc::ptr_eq(&items[0].0, &shared));
            }
            other => panic!("expected an item batch, got {other:?}"),
        }
    }
}

#[test]
fn test_stopped_reconciler_rejects_new_work() {
    let reconciler = Reconciler::new();
    reconciler.stop();
    assert!(reconciler.is_stopped());

    reconciler.reload_all();
    reconciler.reload_item(&item(), ReloadKind::Reload);

    assert!(!reconciler.has_pending());
    assert!(reconciler.flush_due(after_window()).is_none());
}

#[test]
fn test_reload_all_collapses_everything_queued() {
    let reconciler = Reconciler::new();

    reconciler.reload_item(&item(), ReloadKind::Rerender);
    reconciler.reload_sections([0, 4]);
    reconciler.insert_items(&[ItemIndex::new(1, 0)]);
    reconciler.reload_all();

    assert!(matches!(
        reconciler.flush_due(after_window()),
        Some(UpdateBatch::ReloadAll)
    ));
    // One batch carries it all; nothing trails behind.
    assert!(!reconciler.has_pending());
    assert!(reconciler.flush_due(after_window()).is_none());
}
