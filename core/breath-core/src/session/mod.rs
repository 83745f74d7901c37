//! Breathing session engine.
//!
//! One [`ExerciseSession`] per attempt. Three concerns cooperate on a single
//! thread of control through an explicit [`Timer`]:
//!
//! - [`sequencer`]: owns run state, step and cycle; pure, no timers
//! - [`clock`]: one-second countdown, at most one pending tick
//! - [`progress`]: smooth progress anchored to the session start time
//!
//! ```text
//! TimerQueue ──Fired──▶ ExerciseSession ──┬─▶ SessionClock ──tick()──▶ PhaseSequencer
//!     ▲                                   ├─▶ ProgressFeed (progress only)
//!     └────────── schedule / cancel ──────┴─▶ Haptics, CompletionSink
//! ```
//!
//! The clock and the feed write disjoint fields: the sequencer's
//! state/step/cycle/countdown versus the feed's progress.

pub mod clock;
pub mod display;
pub mod hooks;
pub mod progress;
mod runner;
pub mod sequencer;
pub mod timer;

pub use clock::SessionClock;
pub use display::{CueGradient, PhaseColor, SessionView};
pub use hooks::{CompletionSink, Haptics, NoHaptics};
pub use progress::ProgressFeed;
pub use runner::{ExerciseSession, SessionEvent, SessionOptions, DEFAULT_LEAD_IN};
pub use sequencer::{is_expanded_at, Advance, PhaseSequencer, TickOutcome};
pub use timer::{CancelHandle, Fired, Timer, TimerEvent, TimerQueue};
