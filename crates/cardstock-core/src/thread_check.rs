//! Thread affinity checks for single-threaded objects.
//!
//! The binding layer mutates host widget state and therefore runs on the
//! host's UI thread. Objects with thread affinity record the thread they
//! were created on and verify, in debug builds, that later operations stay
//! on that thread.
//!
//! # Usage
//!
//! ```
//! use cardstock_core::thread_check::ThreadAffinity;
//!
//! struct UpdateQueue {
//!     affinity: ThreadAffinity,
//!     pending: std::cell::RefCell<Vec<u32>>,
//! }
//!
//! impl UpdateQueue {
//!     fn new() -> Self {
//!         Self {
//!             affinity: ThreadAffinity::current(),
//!             pending: std::cell::RefCell::new(Vec::new()),
//!         }
//!     }
//!
//!     fn push(&self, id: u32) {
//!         // Panic in debug builds if called from the wrong thread
//!         self.affinity.debug_assert_same_thread();
//!         self.pending.borrow_mut().push(id);
//!     }
//! }
//! ```
//!
//! Two levels of checking are provided:
//!
//! - **Debug assertions** (`debug_assert_same_thread`): Only active in debug
//!   builds. Use these liberally for zero-cost production performance.
//! - **Runtime assertions** (`assert_same_thread`): Always active. Use for
//!   critical operations where thread safety must be verified even in
//!   release builds.

use std::thread::ThreadId;

/// Thread affinity tracker for objects.
///
/// Records the thread on which an object was created and provides methods
/// to verify that subsequent operations occur on the same thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the same thread as the affinity.
    ///
    /// This always runs (debug and release builds).
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if called from a different thread.
    #[inline]
    pub fn assert_same_thread(&self) {
        self.assert_same_thread_with_msg("object accessed from wrong thread")
    }

    /// Assert that we are on the same thread, with a custom message.
    ///
    /// # Panics
    ///
    /// Panics if called from a different thread.
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(msg);
        }
    }

    /// Debug-only assertion that we are on the same thread.
    ///
    /// This is a no-op in release builds.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread();
    }

    /// Debug-only assertion with a custom message.
    #[inline]
    pub fn debug_assert_same_thread_with_msg(&self, msg: &str) {
        #[cfg(debug_assertions)]
        self.assert_same_thread_with_msg(msg);
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        let current_id = current.id();

        panic!(
            "\n\
            ══════════════════════════════════════════════════════════════════════\n\
            THREAD AFFINITY VIOLATION\n\
            ══════════════════════════════════════════════════════════════════════\n\
            \n\
            {msg}\n\
            \n\
            Object was created on thread: {:?}\n\
            Current thread: \"{current_name}\" (ID: {current_id:?})\n\
            \n\
            This object has thread affinity and must only be accessed from the\n\
            thread on which it was created. Binding, layout, and update\n\
            scheduling all mutate host widget state, so they must stay on the\n\
            host's UI thread.\n\
            \n\
            POSSIBLE SOLUTIONS:\n\
            \n\
            1. Marshal the call onto the UI thread before touching the binder\n\
            2. Compute new content on the worker thread, then hand the finished\n\
               sections to the UI thread for assignment\n\
            \n\
            ══════════════════════════════════════════════════════════════════════",
            self.thread_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_thread_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        // Should not panic
        affinity.assert_same_thread();
    }

    #[test]
    fn test_thread_affinity_different_thread() {
        let affinity = ThreadAffinity::current();
        let original_id = std::thread::current().id();

        let result = Arc::new(AtomicBool::new(false));
        let result_clone = result.clone();

        let handle = std::thread::spawn(move || {
            // is_same_thread should return false from a different thread
            result_clone.store(!affinity.is_same_thread(), Ordering::SeqCst);
        });

        handle.join().unwrap();
        assert!(
            result.load(Ordering::SeqCst),
            "is_same_thread() should return false from different thread"
        );

        // Verify we're back on the original thread
        assert_eq!(std::thread::current().id(), original_id);
    }

    #[test]
    fn test_thread_affinity_panic_on_wrong_thread() {
        let affinity = ThreadAffinity::current();

        let result = std::thread::spawn(move || {
            affinity.assert_same_thread();
        })
        .join();

        // The spawned thread should have panicked
        assert!(result.is_err(), "Expected thread to panic with affinity violation");
    }

    #[test]
    fn test_thread_affinity_with_custom_message() {
        let affinity = ThreadAffinity::current();
        // Should not panic on same thread
        affinity.assert_same_thread_with_msg("Custom message");
    }

    #[test]
    fn test_thread_affinity_debug_assert_same_thread() {
        let affinity = ThreadAffinity::current();
        // Should not panic on same thread
        affinity.debug_assert_same_thread();
    }

    #[test]
    fn test_thread_affinity_default() {
        let affinity = ThreadAffinity::default();
        assert!(affinity.is_same_thread());
    }

    #[test]
    fn test_thread_affinity_clone() {
        let affinity1 = ThreadAffinity::current();
        let affinity2 = affinity1;

        assert_eq!(affinity1.thread_id(), affinity2.thread_id());
        assert!(affinity2.is_same_thread());
    }
}
