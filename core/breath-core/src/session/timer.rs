//! Timer capability shared by the session clock, the progress feed and the lead-in.
//!
//! Callbacks are plain data: a [`TimerEvent`] tagged with the
//! [`CancelHandle`] it was scheduled under. Whoever drives the timer hands
//! fired entries back to the session, which checks the handle against the
//! one it still holds before acting on it.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Identifies one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CancelHandle(pub(crate) u64);

/// Which session component a scheduled callback belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    /// One-shot "get ready" delay before the session starts.
    LeadIn,
    /// One-second step countdown.
    Tick,
    /// High-frequency progress sampling.
    Sample,
}

/// A callback that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: CancelHandle,
    pub event: TimerEvent,
    /// Deadline the callback was scheduled for.
    pub at: Duration,
}

pub trait Timer {
    /// Current monotonic time of this timer.
    fn now(&self) -> Duration;

    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> CancelHandle;

    /// Returns false if the handle already fired or was cancelled.
    fn cancel(&mut self, handle: CancelHandle) -> bool;
}

/// Cooperative single-threaded scheduler with its own monotonic clock.
///
/// Tests advance it virtually; the CLI sleeps until [`TimerQueue::next_deadline`]
/// and then feeds wall-clock elapsed time into [`TimerQueue::pop_due`].
/// Entries with the same deadline fire in scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, u64), TimerEvent>,
    deadlines: HashMap<u64, Duration>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Removes the earliest entry due at or before `until`, moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let (&(deadline, id), _) = self.pending.iter().next()?;
        if deadline > until {
            return None;
        }

        let event = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);

        Some(Fired {
            handle: CancelHandle(id),
            event,
            at: deadline,
        })
    }

    /// Moves the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }
}

impl Timer for TimerQueue {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> CancelHandle {
        let id = self.next_id;
        self.next_id += 1;

        let deadline = self.now + delay;
        self.pending.insert((deadline, id), event);
        self.deadlines.insert(id, deadline);

        CancelHandle(id)
    }

    fn cancel(&mut self, handle: CancelHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => self.pending.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }
}
