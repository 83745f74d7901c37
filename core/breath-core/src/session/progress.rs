//! Progress feed: smooth session progress anchored to the session start time.
//!
//! Progress is `elapsed / total_planned`, sampled every few milliseconds.
//! Anchoring to an absolute start instead of counting ticks keeps it free of
//! accumulated timer drift. `total_planned` is fixed when the feed is built.

use std::time::Duration;

use super::timer::{CancelHandle, Timer, TimerEvent};
use crate::types::BreathingExercise;

/// Roughly one animation frame.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(16);
pub const MAX_SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct ProgressFeed {
    total_planned: Duration,
    interval: Duration,
    started_at: Option<Duration>,
    progress: f64,
    pending: Option<CancelHandle>,
    completed: bool,
}

impl ProgressFeed {
    pub fn new(exercise: &BreathingExercise, interval: Duration) -> Self {
        Self {
            total_planned: exercise.total_duration(),
            interval,
            started_at: None,
            progress: 0.0,
            pending: None,
            completed: false,
        }
    }

    pub fn total_planned(&self) -> Duration {
        self.total_planned
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_sampling(&self) -> bool {
        self.pending.is_some()
    }

    /// Resets to zero and begins sampling from `session_start`.
    pub fn start<T: Timer>(&mut self, timer: &mut T, session_start: Duration) {
        self.cancel(timer);
        self.started_at = Some(session_start);
        self.progress = 0.0;
        self.completed = false;
        self.pending = Some(timer.schedule(self.interval, TimerEvent::Sample));
    }

    /// Claims a fired sample. Returns false for a handle this feed no longer owns.
    pub fn on_fire(&mut self, handle: CancelHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Recomputes progress at `now` and reschedules while running and incomplete.
    pub fn sample<T: Timer>(&mut self, timer: &mut T, now: Duration, running: bool) -> f64 {
        let Some(started_at) = self.started_at else {
            return self.progress;
        };

        let fraction = if self.total_planned.is_zero() {
            1.0
        } else {
            let elapsed = now.saturating_sub(started_at);
            (elapsed.as_secs_f64() / self.total_planned.as_secs_f64()).min(1.0)
        };
        self.progress = self.progress.max(fraction);

        if running && self.progress < 1.0 && self.pending.is_none() {
            self.pending = Some(timer.schedule(self.interval, TimerEvent::Sample));
        }

        self.progress
    }

    /// Stops sampling and pins progress to exactly 1.0. Returns false if already done.
    pub fn finish<T: Timer>(&mut self, timer: &mut T) -> bool {
        self.cancel(timer);
        if self.completed {
            return false;
        }
        self.completed = true;
        self.progress = 1.0;
        true
    }

    pub fn cancel<T: Timer>(&mut self, timer: &mut T) {
        if let Some(handle) = self.pending.take() {
            timer.cancel(handle);
        }
    }
}
