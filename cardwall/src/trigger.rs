//! Scroll-proximity trigger: watches visible-range notifications from the
//! windowing primitive and, debounced, asks for more content.
//!
//! ## Usage
//!
//! Feed every visible-range notification into
//! [`ScrollProximityTrigger::notify_visible_range`] and poll the trigger
//! from the event loop with the current time. Scroll events arrive at
//! high frequency; the debounce window coalesces a burst into a single
//! request.
//!
//! All operations take an explicit `now`, so tests drive the state
//! machine without real delays.
use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Default quiet interval before a scheduled request fires.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(150);
/// Default distance from the window's end, in rows, that counts as near.
pub const DEFAULT_THRESHOLD_ROWS: usize = 2;

/// Row range reported visible by the windowing primitive. Transient,
/// never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRange {
    /// First visible row.
    pub first_row: usize,
    /// Last visible row.
    pub last_row: usize,
}

/// Two-state debounce machine: idle, or holding one pending deadline.
///
/// At most one deadline is pending at any time; a notification arriving
/// while pending replaces it.
pub struct ScrollProximityTrigger {
    debounce_window: Duration,
    threshold_rows: usize,
    deadline: Option<Instant>,
}

impl ScrollProximityTrigger {
    /// Creates an idle trigger.
    pub fn new(debounce_window: Duration, threshold_rows: usize) -> Self {
        Self {
            debounce_window,
            threshold_rows,
            deadline: None,
        }
    }

    /// Whether a deferred request is currently scheduled.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Handles one visible-range notification.
    ///
    /// From idle, schedules a deferred request when the viewport is near
    /// the end of the rendered window, more content exists, and no load
    /// is in flight. While pending, any notification reschedules the
    /// deadline, coalescing rapid scroll events into a single trigger.
    pub fn notify_visible_range(
        &mut self,
        range: VisibleRange,
        row_count: usize,
        has_next_page: bool,
        loading: bool,
        now: Instant,
    ) {
        if self.deadline.is_some() {
            self.deadline = Some(now + self.debounce_window);
            return;
        }

        let near_end = range.last_row + self.threshold_rows >= row_count;
        if near_end && has_next_page && !loading {
            trace!(last_row = range.last_row, row_count, "load-more scheduled");
            self.deadline = Some(now + self.debounce_window);
        }
    }

    /// Fires the pending request once its deadline has passed.
    ///
    /// Conditions are re-validated at fire time; whatever the outcome,
    /// the trigger returns to idle. Returns `true` when the caller should
    /// request more content.
    pub fn poll(&mut self, now: Instant, has_next_page: bool, loading: bool) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let fire = has_next_page && !loading;
                if fire {
                    debug!("load-more trigger fired");
                } else {
                    trace!("pending load-more dropped, conditions changed");
                }
                fire
            }
            _ => false,
        }
    }

    /// Discards any pending request, e.g. on a source identity change.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for ScrollProximityTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW, DEFAULT_THRESHOLD_ROWS)
    }
}
