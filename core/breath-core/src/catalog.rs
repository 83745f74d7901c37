//! Exercise catalog.
//!
//! Exercises come from an [`ExerciseSource`]: the built-in presets, or a
//! JSON array in the seed-file format. Sessions never mutate them.

use std::path::{Path, PathBuf};

use fs_err as fs;
use once_cell::sync::Lazy;

use crate::error::{BreathError, Result};
use crate::types::{BreathingExercise, BreathingStep, Phase};
use crate::validation::validate_exercise;

pub trait ExerciseSource {
    /// Fetches the full list. Each call re-reads the source.
    fn get_exercises(&self) -> Result<Vec<BreathingExercise>>;
}

/// Looks up one exercise by id.
pub fn find_exercise(source: &dyn ExerciseSource, id: &str) -> Result<BreathingExercise> {
    source
        .get_exercises()?
        .into_iter()
        .find(|exercise| exercise.id == id)
        .ok_or_else(|| BreathError::ExerciseNotFound(id.to_string()))
}

/// Favorites first, each group keeping catalog order.
pub fn order_by_favorites(
    mut exercises: Vec<BreathingExercise>,
    favorites: &[String],
) -> Vec<BreathingExercise> {
    exercises.sort_by_key(|exercise| !favorites.contains(&exercise.id));
    exercises
}

// ═══════════════════════════════════════════════════════════════════════════════
// Built-in Presets
// ═══════════════════════════════════════════════════════════════════════════════

fn preset(
    id: &str,
    title: &str,
    description: &str,
    mood: &str,
    total_cycles: u32,
    pattern: &[(Phase, u32)],
) -> BreathingExercise {
    BreathingExercise {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        mood: mood.to_string(),
        pattern: pattern
            .iter()
            .map(|&(phase, duration)| BreathingStep::new(phase, duration))
            .collect(),
        total_cycles,
    }
}

static PRESETS: Lazy<Vec<BreathingExercise>> = Lazy::new(|| {
    use Phase::{Exhale, Hold, Inhale};
    vec![
        preset(
            "just-center",
            "Just... Center",
            "Find your focus and calm your nerves with this simple, structured breathing pattern.",
            "Focus & Calm",
            8,
            &[(Inhale, 4), (Hold, 4), (Exhale, 4), (Hold, 4)],
        ),
        preset(
            "just-sleep",
            "Just... Sleep",
            "A powerful relaxing breath known to reduce anxiety and prepare the body for deep rest.",
            "Deep Relaxation",
            5,
            &[(Inhale, 4), (Hold, 7), (Exhale, 8)],
        ),
        preset(
            "just-awaken",
            "Just... Awaken",
            "A quick and powerful exercise to start your day with a boost of natural energy and alertness.",
            "Energy Boost",
            10,
            &[(Inhale, 3), (Exhale, 3)],
        ),
        // Physiological sigh: two sequential inhales, not one merged step.
        preset(
            "just-release",
            "Just... Release",
            "Based on the 'Physiological Sigh,' this rapidly reduces stress by resetting the nervous system.",
            "Instant Relief",
            5,
            &[(Inhale, 3), (Inhale, 1), (Exhale, 6)],
        ),
        preset(
            "just-flow",
            "Just... Flow",
            "Known as 'Coherent Breathing,' this balances the heart and mind, building resilience to stress.",
            "Build Resilience",
            8,
            &[(Inhale, 5), (Exhale, 5)],
        ),
        preset(
            "just-balance",
            "Just... Balance",
            "A simple 'Unilateral' breath to harmonize the left and right sides of the brain, enhancing clarity.",
            "Mental Clarity",
            7,
            &[(Inhale, 4), (Exhale, 6), (Inhale, 4), (Exhale, 6)],
        ),
        preset(
            "just-settle",
            "Just... Settle",
            "A foundational 'Diaphragmatic' breath to anchor you in the present and reduce physical tension.",
            "Grounding",
            6,
            &[(Inhale, 4), (Exhale, 8)],
        ),
        preset(
            "just-be",
            "Just... Be",
            "A gentle rhythm to bring your heart rate to a resonant frequency, promoting deep, restorative calm.",
            "Restorative Calm",
            7,
            &[(Inhale, 4), (Exhale, 6)],
        ),
    ]
});

/// The built-in presets.
#[derive(Debug, Default, Clone, Copy)]
pub struct PresetCatalog;

impl ExerciseSource for PresetCatalog {
    fn get_exercises(&self) -> Result<Vec<BreathingExercise>> {
        Ok(PRESETS.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// File Catalog
// ═══════════════════════════════════════════════════════════════════════════════

/// A JSON array of exercises on disk. Entries that fail validation are skipped.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExerciseSource for FileCatalog {
    fn get_exercises(&self) -> Result<Vec<BreathingExercise>> {
        let content = fs::read_to_string(&self.path).map_err(|source| BreathError::Io {
            context: format!("reading exercise catalog {}", self.path.display()),
            source,
        })?;
        let entries: Vec<BreathingExercise> =
            serde_json::from_str(&content).map_err(|source| BreathError::Json {
                context: format!("parsing exercise catalog {}", self.path.display()),
                source,
            })?;

        let exercises = entries
            .into_iter()
            .filter(|exercise| match validate_exercise(exercise) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping invalid catalog entry");
                    false
                }
            })
            .collect();
        Ok(exercises)
    }
}

/// Uses the catalog file when present, else the built-in presets.
pub fn default_source(exercises_file: &Path) -> Box<dyn ExerciseSource> {
    if exercises_file.exists() {
        tracing::debug!(path = %exercises_file.display(), "Using exercise catalog file");
        Box::new(FileCatalog::new(exercises_file))
    } else {
        Box::new(PresetCatalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_presets_are_valid_and_unique() {
        let exercises = PresetCatalog.get_exercises().unwrap();
        assert_eq!(exercises.len(), 8);
        for exercise in &exercises {
            validate_exercise(exercise).unwrap();
        }
        let mut ids: Vec<_> = exercises.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_find_exercise() {
        let exercise = find_exercise(&PresetCatalog, "just-sleep").unwrap();
        assert_eq!(exercise.total_cycles, 5);
        assert_eq!(exercise.total_duration_secs(), 95);
    }

    #[test]
    fn test_find_missing_exercise() {
        let err = find_exercise(&PresetCatalog, "just-panic").unwrap_err();
        assert!(matches!(err, BreathError::ExerciseNotFound(ref id) if id == "just-panic"));
    }

    #[test]
    fn test_order_by_favorites_is_stable() {
        let exercises = PresetCatalog.get_exercises().unwrap();
        let favorites = vec!["just-be".to_string(), "just-sleep".to_string()];
        let ordered = order_by_favorites(exercises, &favorites);
        let ids: Vec<_> = ordered.iter().take(3).map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["just-sleep", "just-be", "just-center"]);
    }

    #[test]
    fn test_file_catalog_skips_invalid_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("exercises.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "ok", "title": "Ok", "pattern": [{"phase": "Inhale", "duration": 2}], "totalCycles": 1},
                {"id": "empty", "title": "Empty", "pattern": [], "totalCycles": 1}
            ]"#,
        )
        .unwrap();

        let exercises = FileCatalog::new(&path).get_exercises().unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].id, "ok");
    }

    #[test]
    fn test_file_catalog_reports_missing_file() {
        let temp = TempDir::new().unwrap();
        let catalog = FileCatalog::new(temp.path().join("nope.json"));
        assert!(matches!(catalog.get_exercises(), Err(BreathError::Io { .. })));
    }

    #[test]
    fn test_default_source_falls_back_to_presets() {
        let temp = TempDir::new().unwrap();
        let source = default_source(&temp.path().join("exercises.json"));
        assert_eq!(source.get_exercises().unwrap().len(), 8);
    }
}
