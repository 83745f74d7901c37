//! Aggregated session history.
//!
//! Only completed sessions are recorded; an abandoned attempt never reaches
//! this module. Streaks are counted in UTC calendar days of `completed_at`.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::CompletionSink;
use crate::storage::{load_json_or_default, save_json, StorageConfig};
use crate::types::SessionLog;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct History {
    pub last_session: Option<SessionLog>,
    /// Completed sessions per exercise id.
    pub counts: BTreeMap<String, u32>,
    /// Consecutive days with at least one session, ending at `last_session_date`.
    pub streak: u32,
    pub last_session_date: Option<NaiveDate>,
    pub total_breaths: u64,
    pub minutes_breathing: u64,
    pub longest_streak: u32,
    pub total_sessions: u32,
}

impl History {
    pub fn record(&mut self, log: &SessionLog) {
        let today = log.completed_at.date_naive();
        let yesterday = today.checked_sub_days(Days::new(1));

        self.streak = match self.last_session_date {
            Some(last) if Some(last) == yesterday => self.streak + 1,
            Some(last) if last == today => self.streak.max(1),
            _ => 1,
        };

        *self.counts.entry(log.exercise_id.clone()).or_insert(0) += 1;
        self.total_breaths += log.breath_count;
        self.minutes_breathing += rounded_minutes(log.duration_seconds);
        self.longest_streak = self.longest_streak.max(self.streak);
        self.total_sessions += 1;
        self.last_session = Some(log.clone());
        self.last_session_date = Some(today);
    }

    /// Most-completed exercise; ties go to the smallest id.
    pub fn top_exercise(&self) -> Option<&str> {
        self.counts
            .iter()
            .max_by(|(a_id, a_count), (b_id, b_count)| {
                a_count.cmp(b_count).then_with(|| b_id.cmp(a_id))
            })
            .map(|(id, _)| id.as_str())
    }
}

/// Nearest whole minute, halves rounding up.
fn rounded_minutes(seconds: u64) -> u64 {
    (seconds + 30) / 60
}

/// File-backed history document. Acts as the completion sink for sessions.
pub struct HistoryStore {
    storage: StorageConfig,
    history: History,
}

impl HistoryStore {
    pub fn load(storage: &StorageConfig) -> Self {
        Self {
            storage: storage.clone(),
            history: load_json_or_default(&storage.history_file()),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

impl CompletionSink for HistoryStore {
    fn log_session(&mut self, log: &SessionLog) -> Result<()> {
        let mut updated = self.history.clone();
        updated.record(log);
        save_json(&self.storage.history_file(), &updated)?;
        self.history = updated;
        tracing::debug!(
            exercise_id = %log.exercise_id,
            streak = self.history.streak,
            total_sessions = self.history.total_sessions,
            "History updated"
        );
        Ok(())
    }
}
