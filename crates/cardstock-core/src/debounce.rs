//! Trailing-edge debounce timing.
//!
//! A [`Debouncer`] tracks a single restartable deadline. Every restart
//! pushes the deadline out by the configured delay, so a burst of requests
//! collapses into one firing once the burst goes quiet.

use std::time::{Duration, Instant};

/// A restartable single-deadline timer.
///
/// Unlike a periodic timer there is at most one pending deadline. Callers
/// poll with [`fire_if_due`](Self::fire_if_due); the debouncer never spawns
/// threads or schedules wakeups itself, which keeps it usable from any
/// event loop that can ask "how long until I should poll again?" via
/// [`time_until_fire`](Self::time_until_fire).
///
/// All methods take the current instant explicitly so that callers drive
/// the clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Quiet period required before the deadline lapses.
    delay: Duration,
    /// The pending deadline, if any.
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The configured quiet period.
    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Push the deadline out to `now + delay`, replacing any earlier one.
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is pending.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time remaining until the pending deadline, if any.
    ///
    /// Returns `Duration::ZERO` for a deadline that has already lapsed.
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| {
            if deadline > now {
                deadline - now
            } else {
                Duration::ZERO
            }
        })
    }

    /// Consume the deadline if it has lapsed.
    ///
    /// Returns `true` at most once per lapsed deadline; the debouncer is
    /// idle afterwards until restarted.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                tracing::trace!(target: "cardstock_core::debounce", "debounce deadline lapsed");
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// Ensure Debouncer is Send + Sync
static_assertions::assert_impl_all!(Debouncer: Send, Sync);
