//! Session clock: one pending tick at a time, only while the session runs.

use std::time::Duration;

use super::timer::{CancelHandle, Timer, TimerEvent};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct SessionClock {
    interval: Duration,
    pending: Option<CancelHandle>,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl SessionClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedules the next tick when running with time left on the step.
    ///
    /// A zero countdown is never armed: the step is advanced by the tick that
    /// exhausted it, so scheduling here would count the boundary twice.
    pub fn arm<T: Timer>(&mut self, timer: &mut T, running: bool, countdown: u32) -> bool {
        if !running || countdown == 0 || self.pending.is_some() {
            return false;
        }

        self.pending = Some(timer.schedule(self.interval, TimerEvent::Tick));
        true
    }

    /// Claims a fired tick. Returns false for a handle this clock no longer owns.
    pub fn on_fire(&mut self, handle: CancelHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel<T: Timer>(&mut self, timer: &mut T) {
        if let Some(handle) = self.pending.take() {
            timer.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::timer::TimerQueue;

    #[test]
    fn test_arm_schedules_one_tick() {
        let mut timer = TimerQueue::new();
        let mut clock = SessionClock::default();

        assert!(clock.arm(&mut timer, true, 4));
        assert!(!clock.arm(&mut timer, true, 4));
        assert_eq!(timer.pending_len(), 1);
        assert_eq!(timer.next_deadline(), Some(TICK_INTERVAL));
    }

    #[test]
    fn test_arm_skips_when_not_running_or_exhausted() {
        let mut timer = TimerQueue::new();
        let mut clock = SessionClock::default();

        assert!(!clock.arm(&mut timer, false, 4));
        assert!(!clock.arm(&mut timer, true, 0));
        assert_eq!(timer.pending_len(), 0);
    }

    #[test]
    fn test_on_fire_ignores_foreign_handles() {
        let mut timer = TimerQueue::new();
        let mut clock = SessionClock::default();
        let foreign = timer.schedule(Duration::from_millis(5), TimerEvent::Sample);
        clock.arm(&mut timer, true, 2);

        assert!(!clock.on_fire(foreign));
        assert!(clock.is_armed());

        let fired = timer.pop_due(TICK_INTERVAL).unwrap();
        assert_eq!(fired.handle, foreign);
        let fired = timer.pop_due(TICK_INTERVAL).unwrap();
        assert!(clock.on_fire(fired.handle));
        assert!(!clock.is_armed());
    }

    #[test]
    fn test_cancel_releases_pending_tick() {
        let mut timer = TimerQueue::new();
        let mut clock = SessionClock::default();
        clock.arm(&mut timer, true, 2);

        clock.cancel(&mut timer);
        clock.cancel(&mut timer);
        assert!(!clock.is_armed());
        assert_eq!(timer.pending_len(), 0);
    }
}
