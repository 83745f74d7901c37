//! Exercise session: the sequencer, clock, progress feed and lead-in for one attempt.
//!
//! The session owns its timer. Every exit path (finish, abandon, dismiss,
//! drop) cancels whatever the session still has pending, and a callback
//! that arrives after teardown or with a handle the session no longer
//! holds is ignored.

use std::time::Duration;

use chrono::Utc;

use super::clock::{SessionClock, TICK_INTERVAL};
use super::display::SessionView;
use super::hooks::{CompletionSink, Haptics};
use super::progress::{ProgressFeed, DEFAULT_SAMPLE_INTERVAL, MAX_SAMPLE_INTERVAL};
use super::sequencer::{Advance, PhaseSequencer, TickOutcome};
use super::timer::{CancelHandle, Fired, Timer, TimerEvent, TimerQueue};
use crate::error::{BreathError, Result};
use crate::types::{BreathingExercise, Phase, RunState, SessionLog, SessionRunState};
use crate::validation::validate_exercise;

pub const DEFAULT_LEAD_IN: Duration = Duration::from_secs(3);

/// Timing and preference knobs for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub haptics_enabled: bool,
    pub lead_in: Duration,
    pub tick_interval: Duration,
    pub sample_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            haptics_enabled: true,
            lead_in: DEFAULT_LEAD_IN,
            tick_interval: TICK_INTERVAL,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

impl SessionOptions {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(BreathError::InvalidOption(
                "tick interval must be positive".to_string(),
            ));
        }
        if self.sample_interval.is_zero() || self.sample_interval > MAX_SAMPLE_INTERVAL {
            return Err(BreathError::InvalidOption(format!(
                "sample interval must be within (0, {}ms]",
                MAX_SAMPLE_INTERVAL.as_millis()
            )));
        }
        Ok(())
    }
}

/// Something a driver may want to render or log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Started,
    Tick { remaining: u32 },
    StepChanged { step_index: usize, phase: Phase },
    CycleChanged { cycle: u32, phase: Phase },
    Finished,
    Progress(f64),
}

pub struct ExerciseSession<T: Timer> {
    timer: T,
    sequencer: PhaseSequencer,
    clock: SessionClock,
    feed: ProgressFeed,
    lead_in: Option<CancelHandle>,
    lead_in_deadline: Option<Duration>,
    options: SessionOptions,
    haptics: Box<dyn Haptics>,
    torn_down: bool,
}

impl<T: Timer> ExerciseSession<T> {
    pub fn new(
        exercise: BreathingExercise,
        timer: T,
        options: SessionOptions,
        haptics: Box<dyn Haptics>,
    ) -> Result<Self> {
        validate_exercise(&exercise)?;
        options.validate()?;

        let feed = ProgressFeed::new(&exercise, options.sample_interval);
        let clock = SessionClock::new(options.tick_interval);

        Ok(Self {
            timer,
            sequencer: PhaseSequencer::new(exercise),
            clock,
            feed,
            lead_in: None,
            lead_in_deadline: None,
            options,
            haptics,
            torn_down: false,
        })
    }

    pub fn exercise(&self) -> &BreathingExercise {
        self.sequencer.exercise()
    }

    pub fn state(&self) -> RunState {
        self.sequencer.state()
    }

    pub fn is_finished(&self) -> bool {
        self.sequencer.state() == RunState::Finished
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn sequencer(&self) -> &PhaseSequencer {
        &self.sequencer
    }

    pub fn total_planned(&self) -> Duration {
        self.feed.total_planned()
    }

    pub fn snapshot(&self) -> SessionRunState {
        SessionRunState {
            state: self.sequencer.state(),
            step_index: self.sequencer.step_index(),
            cycle: self.sequencer.cycle(),
            countdown: self.sequencer.countdown(),
            session_start: self.sequencer.session_start(),
            progress: self.feed.progress(),
        }
    }

    /// Rendering state for the current frame. `None` only for an exercise
    /// without steps, which `new` never accepts.
    pub fn view(&self) -> Option<SessionView> {
        let step = self.sequencer.current_step()?;
        Some(SessionView::build(
            self.sequencer.state(),
            step.phase,
            step.duration,
            self.sequencer.is_expanded(),
            self.sequencer.countdown(),
            self.sequencer.cycle(),
            self.exercise().total_cycles,
            self.feed.progress(),
        ))
    }

    /// Schedules the "get ready" lead-in. The session starts when it fires.
    pub fn begin(&mut self) -> Result<()> {
        if self.torn_down || self.sequencer.state() != RunState::Ready {
            return Err(BreathError::InvalidTransition {
                operation: "begin",
                state: self.sequencer.state(),
            });
        }
        if self.lead_in.is_some() {
            return Ok(());
        }

        if self.options.lead_in.is_zero() {
            return self.start_now().map(|_| ());
        }

        let handle = self.timer.schedule(self.options.lead_in, TimerEvent::LeadIn);
        self.lead_in = Some(handle);
        self.lead_in_deadline = Some(self.timer.now() + self.options.lead_in);
        tracing::debug!(
            exercise_id = %self.exercise().id,
            lead_in = ?self.options.lead_in,
            "Lead-in scheduled"
        );
        Ok(())
    }

    /// Whole seconds left on the lead-in, rounded up, while it is pending.
    pub fn lead_in_remaining(&self) -> Option<u64> {
        let deadline = self.lead_in_deadline?;
        let left = deadline.saturating_sub(self.timer.now());
        let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        Some(secs)
    }

    /// Starts immediately, skipping any pending lead-in.
    pub fn start_now(&mut self) -> Result<Vec<SessionEvent>> {
        if self.torn_down {
            return Err(BreathError::InvalidTransition {
                operation: "start",
                state: self.sequencer.state(),
            });
        }

        let now = self.timer.now();
        self.sequencer.start(now)?;
        self.cancel_lead_in();

        if self.options.haptics_enabled {
            self.haptics.trigger();
        }

        self.feed.start(&mut self.timer, now);
        self.clock.arm(&mut self.timer, true, self.sequencer.countdown());

        Ok(vec![SessionEvent::Started, SessionEvent::Progress(0.0)])
    }

    /// Dispatches a fired timer callback to whichever component owns it.
    pub fn fire(&mut self, fired: Fired) -> Result<Vec<SessionEvent>> {
        if self.torn_down {
            tracing::debug!(event = ?fired.event, "Timer fired after teardown; ignoring");
            return Ok(Vec::new());
        }

        match fired.event {
            TimerEvent::LeadIn => {
                if self.lead_in != Some(fired.handle) {
                    return Ok(self.ignore_stale(fired));
                }
                self.lead_in = None;
                self.lead_in_deadline = None;
                self.start_now()
            }
            TimerEvent::Tick => {
                if !self.clock.on_fire(fired.handle) {
                    return Ok(self.ignore_stale(fired));
                }
                self.on_tick()
            }
            TimerEvent::Sample => {
                if !self.feed.on_fire(fired.handle) {
                    return Ok(self.ignore_stale(fired));
                }
                let running = self.sequencer.state() == RunState::Running;
                let progress = self.feed.sample(&mut self.timer, fired.at, running);
                Ok(vec![SessionEvent::Progress(progress)])
            }
        }
    }

    fn on_tick(&mut self) -> Result<Vec<SessionEvent>> {
        let outcome = self.sequencer.tick()?;
        let mut events = Vec::with_capacity(2);

        match outcome {
            TickOutcome::Counting { remaining } => {
                events.push(SessionEvent::Tick { remaining });
            }
            TickOutcome::Advanced(advance) => {
                events.push(SessionEvent::Tick { remaining: 0 });
                // Every advance is felt, including the one into Finished.
                if self.options.haptics_enabled {
                    self.haptics.trigger();
                }
                match advance {
                    Advance::StepBoundary { step_index, phase } => {
                        events.push(SessionEvent::StepChanged { step_index, phase });
                    }
                    Advance::CycleBoundary { cycle, phase } => {
                        events.push(SessionEvent::CycleChanged { cycle, phase });
                    }
                    Advance::Finished => {
                        self.clock.cancel(&mut self.timer);
                        self.feed.finish(&mut self.timer);
                        events.push(SessionEvent::Progress(1.0));
                        events.push(SessionEvent::Finished);
                        return Ok(events);
                    }
                }
            }
        }

        self.clock.arm(
            &mut self.timer,
            self.sequencer.state() == RunState::Running,
            self.sequencer.countdown(),
        );
        Ok(events)
    }

    fn ignore_stale(&self, fired: Fired) -> Vec<SessionEvent> {
        tracing::debug!(
            event = ?fired.event,
            handle = ?fired.handle,
            "Stale timer callback ignored"
        );
        Vec::new()
    }

    fn cancel_lead_in(&mut self) {
        if let Some(handle) = self.lead_in.take() {
            self.timer.cancel(handle);
        }
        self.lead_in_deadline = None;
    }

    /// Cancels every pending callback. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.cancel_lead_in();
        self.clock.cancel(&mut self.timer);
        self.feed.cancel(&mut self.timer);
        self.torn_down = true;
        tracing::debug!(
            exercise_id = %self.sequencer.exercise().id,
            state = ?self.sequencer.state(),
            "Session torn down"
        );
    }

    /// Hands the finished session to the completion sink. Only valid once Finished.
    pub fn dismiss(mut self, sink: &mut dyn CompletionSink) -> Result<SessionLog> {
        if self.sequencer.state() != RunState::Finished {
            return Err(BreathError::InvalidTransition {
                operation: "dismiss",
                state: self.sequencer.state(),
            });
        }
        self.teardown();

        let log = SessionLog::for_exercise(self.sequencer.exercise(), Utc::now());
        sink.log_session(&log)?;
        tracing::info!(
            exercise_id = %log.exercise_id,
            duration_seconds = log.duration_seconds,
            breath_count = log.breath_count,
            "Session logged"
        );
        Ok(log)
    }

    /// Leaves without recording anything, whatever the state.
    pub fn abandon(mut self) {
        tracing::info!(
            exercise_id = %self.sequencer.exercise().id,
            state = ?self.sequencer.state(),
            cycle = self.sequencer.cycle(),
            "Session abandoned"
        );
        self.teardown();
    }
}

impl ExerciseSession<TimerQueue> {
    /// Fires everything due up to `until`, in deadline order.
    pub fn run_until(&mut self, until: Duration) -> Result<Vec<SessionEvent>> {
        let mut events = Vec::new();
        while let Some(fired) = self.timer.pop_due(until) {
            events.extend(self.fire(fired)?);
        }
        self.timer.advance_to(until);
        Ok(events)
    }

    /// Fires callbacks until the session finishes or nothing is left pending.
    pub fn run_to_completion(&mut self) -> Result<Vec<SessionEvent>> {
        let mut events = Vec::new();
        while !self.is_finished() {
            let Some(deadline) = self.timer.next_deadline() else {
                break;
            };
            events.extend(self.run_until(deadline)?);
        }
        Ok(events)
    }
}

impl<T: Timer> Drop for ExerciseSession<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
