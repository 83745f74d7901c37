//! # breath-core
//!
//! Core library for Just Be, a guided breathing timer. Owns the session
//! engine (phase sequencing, the once-per-second clock, the progress feed)
//! plus the catalog, settings, history and reminder logic every client shares.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Time is injected through the
//!   [`Timer`] trait; [`TimerQueue`] drives sessions in virtual time.
//! - **Single-threaded**: A session is owned by one driver loop. Callbacks are
//!   plain [`TimerEvent`] values, so nothing is shared behind `Rc<RefCell>`.
//! - **Graceful degradation**: Missing or corrupt documents load as defaults.
//! - **No dangling callbacks**: Dropping an [`ExerciseSession`] cancels every
//!   timer it scheduled, and late deliveries are ignored.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use breath_core::{find_exercise, ExerciseSession, NoHaptics, PresetCatalog, SessionOptions, TimerQueue};
//!
//! let exercise = find_exercise(&PresetCatalog, "just-center")?;
//! let mut session = ExerciseSession::new(
//!     exercise,
//!     TimerQueue::new(),
//!     SessionOptions::default(),
//!     Box::new(NoHaptics),
//! )?;
//! session.start_now()?;
//! let events = session.run_to_completion();
//! ```

pub mod catalog;
pub mod error;
pub mod history;
pub mod reminders;
pub mod session;
pub mod settings;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export commonly used items at crate root
pub use catalog::{
    default_source, find_exercise, order_by_favorites, ExerciseSource, FileCatalog, PresetCatalog,
};
pub use error::{BreathError, Result};
pub use history::{History, HistoryStore};
pub use reminders::{
    collect_reminder_tokens, dispatch_daily_reminder, next_reminder_at, Notifier,
    ReminderOutcome, ReminderPayload, ReminderRecipient,
};
pub use session::*;
pub use settings::{AppSettings, SettingsStore};
pub use storage::StorageConfig;
pub use types::*;
pub use validation::validate_exercise;
