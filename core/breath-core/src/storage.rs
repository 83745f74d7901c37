//! Storage configuration and JSON document persistence for justbe.
//!
//! `StorageConfig` centralizes every path the app touches:
//!
//! ```text
//! ~/.justbe/
//! ├── settings.json    user preferences
//! ├── history.json     aggregated session history
//! ├── exercises.json   optional exercise catalog override
//! └── logs/            CLI log files
//! ```
//!
//! ## Defensive reads
//!
//! Documents are small and rewritten whole, so a read never fails hard:
//! a missing file is the default document, and an empty or corrupt file is
//! logged and treated as the default too.
//!
//! ## Atomic writes
//!
//! Writes go to a temp file in the same directory and are persisted over
//! the target, so a crash never leaves a half-written document behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{BreathError, Result};

/// Overrides the storage root when set.
pub const HOME_ENV_VAR: &str = "JUSTBE_HOME";

/// Central configuration for all justbe storage paths.
///
/// Production code uses [`StorageConfig::from_env`]; tests use
/// [`StorageConfig::with_root`] pointed at a temp directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    /// `$JUSTBE_HOME` if set, else `~/.justbe`.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = std::env::var_os(HOME_ENV_VAR).filter(|value| !value.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }
        let home = dirs::home_dir().ok_or(BreathError::HomeDirNotFound)?;
        Ok(Self::with_root(home.join(".justbe")))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn history_file(&self) -> PathBuf {
        self.root.join("history.json")
    }

    pub fn exercises_file(&self) -> PathBuf {
        self.root.join("exercises.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| BreathError::Io {
            context: format!("creating {}", self.root.display()),
            source,
        })
    }
}

/// Reads a JSON document, falling back to `T::default()` when it is missing or unreadable.
pub fn load_json_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to read document; using defaults");
            return T::default();
        }
    };

    if content.trim().is_empty() {
        tracing::warn!(path = %path.display(), "Empty document; using defaults");
        return T::default();
    }

    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Corrupt document; using defaults");
            T::default()
        }
    }
}

/// Writes a JSON document atomically (temp file + persist).
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(|source| BreathError::Json {
        context: format!("serializing {}", path.display()),
        source,
    })?;

    let parent = path.parent().ok_or_else(|| BreathError::StorageWriteFailed {
        path: path.to_path_buf(),
        details: "path has no parent directory".to_string(),
    })?;
    fs::create_dir_all(parent).map_err(|source| BreathError::Io {
        context: format!("creating {}", parent.display()),
        source,
    })?;

    let write_failed = |details: String| BreathError::StorageWriteFailed {
        path: path.to_path_buf(),
        details,
    };
    let mut temp_file =
        NamedTempFile::new_in(parent).map_err(|e| write_failed(format!("temp file: {}", e)))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| write_failed(format!("write: {}", e)))?;
    temp_file
        .flush()
        .map_err(|e| write_failed(format!("flush: {}", e)))?;
    temp_file
        .persist(path)
        .map_err(|e| write_failed(format!("persist: {}", e.error)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        #[serde(default)]
        name: String,
        #[serde(default)]
        count: u32,
    }

    #[test]
    fn test_paths_under_root() {
        let storage = StorageConfig::with_root(PathBuf::from("/tmp/jb"));
        assert_eq!(storage.settings_file(), PathBuf::from("/tmp/jb/settings.json"));
        assert_eq!(storage.history_file(), PathBuf::from("/tmp/jb/history.json"));
        assert_eq!(storage.exercises_file(), PathBuf::from("/tmp/jb/exercises.json"));
        assert_eq!(storage.logs_dir(), PathBuf::from("/tmp/jb/logs"));
    }

    #[test]
    fn test_missing_file_loads_default() {
        let temp = TempDir::new().unwrap();
        let doc: Doc = load_json_or_default(&temp.path().join("missing.json"));
        assert_eq!(doc, Doc::default());
    }

    #[test]
    fn test_corrupt_and_empty_files_load_default() {
        let temp = TempDir::new().unwrap();
        let corrupt = temp.path().join("corrupt.json");
        let empty = temp.path().join("empty.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        std::fs::write(&empty, "  \n").unwrap();

        assert_eq!(load_json_or_default::<Doc>(&corrupt), Doc::default());
        assert_eq!(load_json_or_default::<Doc>(&empty), Doc::default());
    }

    #[test]
    fn test_save_creates_parent_and_roundtrips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("doc.json");
        let doc = Doc {
            name: "box".to_string(),
            count: 3,
        };

        save_json(&path, &doc).unwrap();
        assert_eq!(load_json_or_default::<Doc>(&path), doc);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.json");
        std::fs::write(&path, r#"{"count": 7}"#).unwrap();

        let doc: Doc = load_json_or_default(&path);
        assert_eq!(doc.count, 7);
        assert!(doc.name.is_empty());
    }
}
