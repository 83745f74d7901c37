//! User preferences.
//!
//! Missing keys take their defaults so older documents keep loading.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{load_json_or_default, save_json, StorageConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub haptics_enabled: bool,
    pub reminders_enabled: bool,
    pub favorite_exercises: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            haptics_enabled: true,
            reminders_enabled: false,
            favorite_exercises: Vec::new(),
        }
    }
}

impl AppSettings {
    pub fn is_favorite(&self, exercise_id: &str) -> bool {
        self.favorite_exercises.iter().any(|id| id == exercise_id)
    }

    /// Adds or removes a favorite. Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&mut self, exercise_id: &str) -> bool {
        if self.is_favorite(exercise_id) {
            self.favorite_exercises.retain(|id| id != exercise_id);
            false
        } else {
            self.favorite_exercises.push(exercise_id.to_string());
            true
        }
    }
}

/// File-backed settings document.
pub struct SettingsStore {
    storage: StorageConfig,
    settings: AppSettings,
}

impl SettingsStore {
    pub fn load(storage: &StorageConfig) -> Self {
        let settings = load_json_or_default(&storage.settings_file());
        Self {
            storage: storage.clone(),
            settings,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Applies `change` and persists the result.
    pub fn update<F>(&mut self, change: F) -> Result<&AppSettings>
    where
        F: FnOnce(&mut AppSettings),
    {
        change(&mut self.settings);
        save_json(&self.storage.settings_file(), &self.settings)?;
        tracing::info!(
            haptics_enabled = self.settings.haptics_enabled,
            reminders_enabled = self.settings.reminders_enabled,
            favorites = self.settings.favorite_exercises.len(),
            "Settings updated"
        );
        Ok(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert!(settings.haptics_enabled);
        assert!(!settings.reminders_enabled);
        assert!(settings.favorite_exercises.is_empty());
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"remindersEnabled": true}"#).unwrap();
        assert!(settings.haptics_enabled);
        assert!(settings.reminders_enabled);
    }

    #[test]
    fn test_document_keys_are_camel_case() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        assert_eq!(json["hapticsEnabled"], true);
        assert_eq!(json["remindersEnabled"], false);
        assert!(json["favoriteExercises"].as_array().unwrap().is_empty());
        assert!(json.get("haptics_enabled").is_none());
    }

    #[test]
    fn test_toggle_favorite() {
        let mut settings = AppSettings::default();
        assert!(settings.toggle_favorite("just-flow"));
        assert!(settings.is_favorite("just-flow"));
        assert!(!settings.toggle_favorite("just-flow"));
        assert!(settings.favorite_exercises.is_empty());
    }

    #[test]
    fn test_store_persists_updates() {
        let temp = TempDir::new().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());

        let mut store = SettingsStore::load(&storage);
        store
            .update(|settings| {
                settings.haptics_enabled = false;
                settings.toggle_favorite("just-be");
            })
            .unwrap();

        let reloaded = SettingsStore::load(&storage);
        assert!(!reloaded.settings().haptics_enabled);
        assert_eq!(reloaded.settings().favorite_exercises, vec!["just-be"]);
    }
}
