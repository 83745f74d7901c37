//! Phase sequencer: drives one exercise attempt through its pattern and cycles.
//!
//! ```text
//! Ready ──start()──▶ Running ──tick() exhausts last step of last cycle──▶ Finished
//!                      │  ▲
//!                      └──┘ tick(): countdown-1, at 0 advance()
//!                           advance(): next step │ next cycle (step 0)
//! ```
//!
//! Finished is absorbing. A new attempt needs a new sequencer.

use std::time::Duration;

use crate::error::{BreathError, Result};
use crate::types::{BreathingExercise, BreathingStep, Phase, RunState};
use crate::validation::validate_exercise;

/// Result of one `advance()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next step within the same cycle.
    StepBoundary { step_index: usize, phase: Phase },
    /// Wrapped to step 0 of the next cycle.
    CycleBoundary { cycle: u32, phase: Phase },
    Finished,
}

/// Result of one `tick()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting { remaining: u32 },
    Advanced(Advance),
}

#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    exercise: BreathingExercise,
    state: RunState,
    step_index: usize,
    cycle: u32,
    countdown: u32,
    session_start: Option<Duration>,
}

impl PhaseSequencer {
    pub fn new(exercise: BreathingExercise) -> Self {
        let countdown = exercise.pattern.first().map_or(0, |step| step.duration);
        Self {
            exercise,
            state: RunState::Ready,
            step_index: 0,
            cycle: 1,
            countdown,
            session_start: None,
        }
    }

    pub fn exercise(&self) -> &BreathingExercise {
        &self.exercise
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn session_start(&self) -> Option<Duration> {
        self.session_start
    }

    pub fn current_step(&self) -> Option<&BreathingStep> {
        self.exercise.pattern.get(self.step_index)
    }

    /// Whether the visual cue should be in its expanded pose.
    pub fn is_expanded(&self) -> bool {
        is_expanded_at(&self.exercise.pattern, self.step_index)
    }

    /// Ready → Running. Validation runs first so a rejected exercise leaves Ready untouched.
    pub fn start(&mut self, now: Duration) -> Result<()> {
        if self.state != RunState::Ready {
            return Err(BreathError::InvalidTransition {
                operation: "start",
                state: self.state,
            });
        }

        validate_exercise(&self.exercise)?;

        self.state = RunState::Running;
        self.step_index = 0;
        self.cycle = 1;
        self.countdown = self.exercise.pattern[0].duration;
        self.session_start = Some(now);

        tracing::info!(
            exercise_id = %self.exercise.id,
            total_cycles = self.exercise.total_cycles,
            steps = self.exercise.pattern.len(),
            "Session started"
        );
        Ok(())
    }

    /// One elapsed second of the current step.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.state != RunState::Running {
            return Err(BreathError::InvalidTransition {
                operation: "tick",
                state: self.state,
            });
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return Ok(TickOutcome::Counting {
                remaining: self.countdown,
            });
        }

        self.advance().map(TickOutcome::Advanced)
    }

    /// Moves past an exhausted step. Only valid once the countdown is at zero.
    pub fn advance(&mut self) -> Result<Advance> {
        if self.state != RunState::Running {
            return Err(BreathError::InvalidTransition {
                operation: "advance",
                state: self.state,
            });
        }

        if self.countdown > 0 {
            tracing::error!(
                exercise_id = %self.exercise.id,
                step_index = self.step_index,
                countdown = self.countdown,
                "Advance requested before step was exhausted"
            );
            return Err(BreathError::DoubleAdvance {
                countdown: self.countdown,
            });
        }

        let pattern = &self.exercise.pattern;
        let next_index = self.step_index + 1;

        if next_index < pattern.len() {
            self.step_index = next_index;
            self.countdown = pattern[next_index].duration;
            return Ok(Advance::StepBoundary {
                step_index: next_index,
                phase: pattern[next_index].phase,
            });
        }

        if self.cycle < self.exercise.total_cycles {
            self.cycle += 1;
            self.step_index = 0;
            self.countdown = pattern[0].duration;
            tracing::debug!(
                exercise_id = %self.exercise.id,
                cycle = self.cycle,
                "Cycle boundary"
            );
            return Ok(Advance::CycleBoundary {
                cycle: self.cycle,
                phase: pattern[0].phase,
            });
        }

        self.state = RunState::Finished;
        tracing::info!(exercise_id = %self.exercise.id, "Session finished");
        Ok(Advance::Finished)
    }
}

/// True for Inhale, and for a Hold whose predecessor in the same pattern is Inhale.
///
/// Step 0 has no predecessor; the previous cycle's last step is never consulted.
pub fn is_expanded_at(pattern: &[BreathingStep], step_index: usize) -> bool {
    match pattern.get(step_index).map(|step| step.phase) {
        Some(Phase::Inhale) => true,
        Some(Phase::Hold) => step_index
            .checked_sub(1)
            .and_then(|prev| pattern.get(prev))
            .is_some_and(|prev| prev.phase == Phase::Inhale),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(pattern: &[(Phase, u32)], total_cycles: u32) -> BreathingExercise {
        BreathingExercise {
            id: "test".to_string(),
            title: "Test".to_string(),
            description: String::new(),
            mood: String::new(),
            pattern: pattern
                .iter()
                .map(|&(phase, duration)| BreathingStep::new(phase, duration))
                .collect(),
            total_cycles,
        }
    }

    fn started(pattern: &[(Phase, u32)], total_cycles: u32) -> PhaseSequencer {
        let mut seq = PhaseSequencer::new(exercise(pattern, total_cycles));
        seq.start(Duration::ZERO).unwrap();
        seq
    }

    /// Ticks until the countdown is about to hit zero.
    fn drain_step(seq: &mut PhaseSequencer) {
        while seq.countdown() > 1 {
            seq.tick().unwrap();
        }
    }

    #[test]
    fn test_new_is_ready_at_first_step() {
        let seq = PhaseSequencer::new(exercise(&[(Phase::Inhale, 4), (Phase::Exhale, 6)], 2));
        assert_eq!(seq.state(), RunState::Ready);
        assert_eq!(seq.step_index(), 0);
        assert_eq!(seq.cycle(), 1);
        assert_eq!(seq.countdown(), 4);
        assert_eq!(seq.session_start(), None);
    }

    #[test]
    fn test_start_records_session_start() {
        let mut seq = PhaseSequencer::new(exercise(&[(Phase::Inhale, 4)], 1));
        seq.start(Duration::from_secs(3)).unwrap();
        assert_eq!(seq.state(), RunState::Running);
        assert_eq!(seq.session_start(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut seq = started(&[(Phase::Inhale, 4)], 1);
        seq.tick().unwrap();

        let err = seq.start(Duration::from_secs(9)).unwrap_err();
        assert!(matches!(
            err,
            BreathError::InvalidTransition {
                operation: "start",
                state: RunState::Running
            }
        ));
        assert_eq!(seq.countdown(), 3);
        assert_eq!(seq.session_start(), Some(Duration::ZERO));
    }

    #[test]
    fn test_start_rejects_invalid_exercise_and_stays_ready() {
        let mut seq = PhaseSequencer::new(exercise(&[(Phase::Inhale, 0)], 1));
        let err = seq.start(Duration::ZERO).unwrap_err();
        assert!(matches!(err, BreathError::InvalidExercise { .. }));
        assert_eq!(seq.state(), RunState::Ready);
        assert_eq!(seq.session_start(), None);
    }

    #[test]
    fn test_start_rejects_empty_pattern() {
        let mut seq = PhaseSequencer::new(exercise(&[], 1));
        assert_eq!(seq.countdown(), 0);
        assert!(seq.start(Duration::ZERO).is_err());
        assert_eq!(seq.state(), RunState::Ready);
    }

    #[test]
    fn test_tick_before_start_is_rejected() {
        let mut seq = PhaseSequencer::new(exercise(&[(Phase::Inhale, 4)], 1));
        assert!(seq.tick().is_err());
        assert_eq!(seq.countdown(), 4);
    }

    #[test]
    fn test_tick_counts_down_within_step() {
        let mut seq = started(&[(Phase::Inhale, 3), (Phase::Exhale, 3)], 1);
        assert_eq!(seq.tick().unwrap(), TickOutcome::Counting { remaining: 2 });
        assert_eq!(seq.tick().unwrap(), TickOutcome::Counting { remaining: 1 });
        assert_eq!(seq.step_index(), 0);
    }

    #[test]
    fn test_intra_cycle_advance_keeps_cycle() {
        let mut seq = started(&[(Phase::Inhale, 2), (Phase::Hold, 2), (Phase::Exhale, 2)], 3);
        drain_step(&mut seq);

        let outcome = seq.tick().unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Advanced(Advance::StepBoundary {
                step_index: 1,
                phase: Phase::Hold
            })
        );
        assert_eq!(seq.cycle(), 1);
        assert_eq!(seq.countdown(), 2);
    }

    #[test]
    fn test_last_step_wraps_to_next_cycle() {
        let mut seq = started(&[(Phase::Inhale, 1), (Phase::Exhale, 1)], 2);
        seq.tick().unwrap();

        let outcome = seq.tick().unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Advanced(Advance::CycleBoundary {
                cycle: 2,
                phase: Phase::Inhale
            })
        );
        assert_eq!(seq.step_index(), 0);
        assert_eq!(seq.state(), RunState::Running);
        assert_eq!(seq.countdown(), 1);
    }

    #[test]
    fn test_last_step_of_last_cycle_finishes_in_place() {
        let mut seq = started(&[(Phase::Inhale, 1), (Phase::Exhale, 2)], 1);
        seq.tick().unwrap();
        seq.tick().unwrap();

        assert_eq!(seq.tick().unwrap(), TickOutcome::Advanced(Advance::Finished));
        assert_eq!(seq.state(), RunState::Finished);
        assert_eq!(seq.step_index(), 1);
        assert_eq!(seq.cycle(), 1);
    }

    #[test]
    fn test_finished_accepts_no_ticks() {
        let mut seq = started(&[(Phase::Inhale, 1)], 1);
        seq.tick().unwrap();

        let err = seq.tick().unwrap_err();
        assert!(matches!(
            err,
            BreathError::InvalidTransition {
                operation: "tick",
                state: RunState::Finished
            }
        ));
        assert_eq!(seq.step_index(), 0);
        assert_eq!(seq.countdown(), 0);
    }

    #[test]
    fn test_advance_with_time_left_is_a_double_advance() {
        let mut seq = started(&[(Phase::Inhale, 4), (Phase::Exhale, 4)], 1);
        let err = seq.advance().unwrap_err();
        assert!(matches!(err, BreathError::DoubleAdvance { countdown: 4 }));
        assert_eq!(seq.step_index(), 0);
    }

    #[test]
    fn test_double_inhale_is_two_steps() {
        let mut seq = started(&[(Phase::Inhale, 3), (Phase::Inhale, 1), (Phase::Exhale, 6)], 1);
        drain_step(&mut seq);
        seq.tick().unwrap();
        assert_eq!(seq.step_index(), 1);
        assert_eq!(seq.current_step().unwrap().phase, Phase::Inhale);
        assert_eq!(seq.countdown(), 1);
    }

    #[test]
    fn test_is_expanded_for_inhale() {
        let pattern = exercise(&[(Phase::Exhale, 1), (Phase::Inhale, 1)], 1).pattern;
        assert!(is_expanded_at(&pattern, 1));
        assert!(!is_expanded_at(&pattern, 0));
    }

    #[test]
    fn test_is_expanded_hold_follows_predecessor() {
        let pattern = exercise(
            &[
                (Phase::Inhale, 4),
                (Phase::Hold, 4),
                (Phase::Exhale, 4),
                (Phase::Hold, 4),
            ],
            1,
        )
        .pattern;
        assert!(is_expanded_at(&pattern, 1));
        assert!(!is_expanded_at(&pattern, 2));
        assert!(!is_expanded_at(&pattern, 3));
    }

    #[test]
    fn test_is_expanded_hold_at_first_step_is_contracted() {
        let pattern = exercise(&[(Phase::Hold, 2), (Phase::Inhale, 2)], 2).pattern;
        assert!(!is_expanded_at(&pattern, 0));
        assert!(!is_expanded_at(&pattern, 5));
    }
}
