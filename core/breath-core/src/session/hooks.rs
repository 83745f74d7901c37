//! Side-effect collaborators injected into a session.

use crate::error::Result;
use crate::types::SessionLog;

/// Fire-and-forget physical feedback (vibration, terminal bell, ...).
pub trait Haptics {
    fn trigger(&mut self);
}

/// Discards every haptic request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn trigger(&mut self) {}
}

impl<F: FnMut()> Haptics for F {
    fn trigger(&mut self) {
        self()
    }
}

/// Receives the outcome of a completed session.
pub trait CompletionSink {
    fn log_session(&mut self, log: &SessionLog) -> Result<()>;
}

impl<F: FnMut(&SessionLog) -> Result<()>> CompletionSink for F {
    fn log_session(&mut self, log: &SessionLog) -> Result<()> {
        self(log)
    }
}

/// Collects logs in memory.
impl CompletionSink for Vec<SessionLog> {
    fn log_session(&mut self, log: &SessionLog) -> Result<()> {
        self.push(log.clone());
        Ok(())
    }
}
