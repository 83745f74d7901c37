//! Core types shared by the session engine, the catalog and the history store.
//!
//! Exercises use camelCase on the wire so the same JSON documents can be
//! read from the remote exercise collection and from a local seed file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Exercise Definitions
// ═══════════════════════════════════════════════════════════════════════════════

/// The instructed breathing action for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
}

impl Phase {
    /// Inhales and exhales count as breaths; holds do not.
    pub fn is_breath(self) -> bool {
        matches!(self, Phase::Inhale | Phase::Exhale)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Inhale => "Inhale",
            Phase::Hold => "Hold",
            Phase::Exhale => "Exhale",
        };
        f.write_str(name)
    }
}

/// One phase+duration pair within a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingStep {
    pub phase: Phase,
    /// Seconds.
    pub duration: u32,
}

impl BreathingStep {
    pub const fn new(phase: Phase, duration: u32) -> Self {
        Self { phase, duration }
    }
}

/// A breathing exercise as supplied by the catalog. Never mutated by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingExercise {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mood: String,
    pub pattern: Vec<BreathingStep>,
    pub total_cycles: u32,
}

impl BreathingExercise {
    /// Seconds in one traversal of the pattern.
    pub fn cycle_seconds(&self) -> u64 {
        self.pattern.iter().map(|step| u64::from(step.duration)).sum()
    }

    /// Planned length of the whole session in seconds.
    pub fn total_duration_secs(&self) -> u64 {
        self.cycle_seconds() * u64::from(self.total_cycles)
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_secs(self.total_duration_secs())
    }

    /// Inhale and exhale steps across every cycle.
    pub fn breath_count(&self) -> u64 {
        let per_cycle = self
            .pattern
            .iter()
            .filter(|step| step.phase.is_breath())
            .count() as u64;
        per_cycle * u64::from(self.total_cycles)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Session Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifecycle stage of one exercise attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Ready,
    Running,
    Finished,
}

/// Point-in-time view of a session, merged from the sequencer and the progress feed.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRunState {
    pub state: RunState,
    pub step_index: usize,
    /// 1-based.
    pub cycle: u32,
    pub countdown: u32,
    /// Monotonic timer time at which the session entered Running.
    pub session_start: Option<Duration>,
    /// In `[0, 1]`.
    pub progress: f64,
}

/// Outcome of a completed session, handed to the history collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
    pub exercise_id: String,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub breath_count: u64,
}

impl SessionLog {
    pub fn for_exercise(exercise: &BreathingExercise, completed_at: DateTime<Utc>) -> Self {
        Self {
            exercise_id: exercise.id.clone(),
            completed_at,
            duration_seconds: exercise.total_duration_secs(),
            breath_count: exercise.breath_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_breathing(cycles: u32) -> BreathingExercise {
        BreathingExercise {
            id: "box".to_string(),
            title: "Box".to_string(),
            description: String::new(),
            mood: String::new(),
            pattern: vec![
                BreathingStep::new(Phase::Inhale, 4),
                BreathingStep::new(Phase::Hold, 4),
                BreathingStep::new(Phase::Exhale, 4),
                BreathingStep::new(Phase::Hold, 4),
            ],
            total_cycles: cycles,
        }
    }

    #[test]
    fn test_session_log_totals() {
        let exercise = box_breathing(2);
        let log = SessionLog::for_exercise(&exercise, Utc::now());
        assert_eq!(log.duration_seconds, 32);
        assert_eq!(log.breath_count, 4);
        assert_eq!(log.exercise_id, "box");
    }

    #[test]
    fn test_double_inhale_counts_as_two_breaths() {
        let exercise = BreathingExercise {
            id: "sigh".to_string(),
            title: "Sigh".to_string(),
            description: String::new(),
            mood: String::new(),
            pattern: vec![
                BreathingStep::new(Phase::Inhale, 3),
                BreathingStep::new(Phase::Inhale, 1),
                BreathingStep::new(Phase::Exhale, 6),
            ],
            total_cycles: 5,
        };
        assert_eq!(exercise.breath_count(), 15);
        assert_eq!(exercise.total_duration_secs(), 50);
    }

    #[test]
    fn test_exercise_reads_camel_case_documents() {
        let json = r#"{
            "id": "just-flow",
            "title": "Just... Flow",
            "pattern": [{"phase": "Inhale", "duration": 5}, {"phase": "Exhale", "duration": 5}],
            "totalCycles": 8
        }"#;
        let exercise: BreathingExercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.total_cycles, 8);
        assert_eq!(exercise.pattern[1].phase, Phase::Exhale);
        assert!(exercise.mood.is_empty());
    }
}
