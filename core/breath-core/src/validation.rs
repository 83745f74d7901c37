//! Exercise validation.
//!
//! Runs before a session leaves Ready, so a malformed exercise never
//! mutates run state.

use crate::error::{BreathError, Result};
use crate::types::BreathingExercise;

pub fn validate_exercise(exercise: &BreathingExercise) -> Result<()> {
    let invalid = |reason: String| BreathError::InvalidExercise {
        id: exercise.id.clone(),
        reason,
    };

    if exercise.id.trim().is_empty() {
        return Err(invalid("id is required".to_string()));
    }

    if exercise.pattern.is_empty() {
        return Err(invalid("pattern has no steps".to_string()));
    }

    if let Some(index) = exercise.pattern.iter().position(|step| step.duration == 0) {
        return Err(invalid(format!("step {} has zero duration", index)));
    }

    if exercise.total_cycles == 0 {
        return Err(invalid("totalCycles must be at least 1".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BreathingStep, Phase};

    fn exercise(pattern: Vec<BreathingStep>, total_cycles: u32) -> BreathingExercise {
        BreathingExercise {
            id: "test".to_string(),
            title: "Test".to_string(),
            description: String::new(),
            mood: String::new(),
            pattern,
            total_cycles,
        }
    }

    #[test]
    fn test_accepts_valid_exercise() {
        let ex = exercise(vec![BreathingStep::new(Phase::Inhale, 3)], 1);
        assert!(validate_exercise(&ex).is_ok());
    }

    #[test]
    fn test_rejects_empty_pattern() {
        let err = validate_exercise(&exercise(vec![], 3)).unwrap_err();
        assert!(matches!(err, BreathError::InvalidExercise { .. }));
        assert!(err.to_string().contains("no steps"));
    }

    #[test]
    fn test_rejects_zero_duration_step() {
        let ex = exercise(
            vec![
                BreathingStep::new(Phase::Inhale, 4),
                BreathingStep::new(Phase::Hold, 0),
            ],
            2,
        );
        let err = validate_exercise(&ex).unwrap_err();
        assert!(err.to_string().contains("step 1"));
    }

    #[test]
    fn test_rejects_zero_cycles() {
        let ex = exercise(vec![BreathingStep::new(Phase::Exhale, 4)], 0);
        assert!(validate_exercise(&ex).is_err());
    }

    #[test]
    fn test_rejects_blank_id() {
        let mut ex = exercise(vec![BreathingStep::new(Phase::Exhale, 4)], 1);
        ex.id = "  ".to_string();
        assert!(validate_exercise(&ex).is_err());
    }
}
