use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::history::SessionSummary;
use crate::mastery::MasteryMap;

const APP_NAME: &str = "math_champion";
const ORG_NAME: &str = "practice";
const MASTERY_FILE: &str = "mastery.json";
const HISTORY_FILE: &str = "history.json";

/// Per-profile persistence.
///
/// Implementations never fail toward the caller: reads fall back to empty data and
/// failed writes are logged.
pub trait Storage {
    fn load_mastery(&self, user_id: &str) -> MasteryMap;
    fn save_mastery(&mut self, user_id: &str, mastery: &MasteryMap);
    /// Most recent first.
    fn load_history(&self, user_id: &str) -> Vec<SessionSummary>;
    fn save_history(&mut self, user_id: &str, history: &[SessionSummary]);
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine data directory")]
    NoDataDir,
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    mastery: HashMap<String, MasteryMap>,
    history: HashMap<String, Vec<SessionSummary>>,
    pub mastery_writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load_mastery(&self, user_id: &str) -> MasteryMap {
        self.mastery.get(user_id).cloned().unwrap_or_default()
    }

    fn save_mastery(&mut self, user_id: &str, mastery: &MasteryMap) {
        self.mastery_writes += 1;
        self.mastery.insert(user_id.to_string(), mastery.clone());
    }

    fn load_history(&self, user_id: &str) -> Vec<SessionSummary> {
        self.history.get(user_id).cloned().unwrap_or_default()
    }

    fn save_history(&mut self, user_id: &str, history: &[SessionSummary]) {
        self.history.insert(user_id.to_string(), history.to_vec());
    }
}

/// JSON files in one directory: `mastery.json` and `history.json`, each a map from
/// user id to that user's data.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    data_dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn default_location() -> StorageResult<Self> {
        data_dir().map(Self::new)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Top-level map of user id to that user's undecoded entry.
    fn read_all(&self, file: &str) -> StorageResult<Map<String, Value>> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Decodes one user's entry; a bad entry only costs that user their data.
    fn read_user<T: DeserializeOwned + Default>(&self, file: &str, user_id: &str) -> T {
        let mut all = match self.read_all(file) {
            Ok(all) => all,
            Err(e) => {
                warn!("Failed to load {file}, using defaults: {e}");
                return T::default();
            }
        };
        let Some(entry) = all.remove(user_id) else {
            return T::default();
        };
        serde_json::from_value(entry).unwrap_or_else(|e| {
            warn!("Bad {file} entry for {user_id}, using defaults: {e}");
            T::default()
        })
    }

    /// Replaces one user's entry and rewrites the whole file.
    ///
    /// Other users' entries are copied through untouched. A file that does not parse is
    /// moved aside to `<file>.corrupt` before a fresh one is written.
    fn write_user<T: Serialize>(&self, file: &str, user_id: &str, value: &T) -> StorageResult<()> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(file);

        let mut all = match self.read_all(file) {
            Ok(all) => all,
            Err(StorageError::Json(e)) => {
                let backup = self.data_dir.join(format!("{file}.corrupt"));
                warn!("Unreadable {file} ({e}), moving it to {}", backup.display());
                fs::rename(&path, &backup)?;
                Map::new()
            }
            Err(e) => return Err(e),
        };
        all.insert(user_id.to_string(), serde_json::to_value(value)?);

        let json = serde_json::to_string_pretty(&all)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        debug!("Wrote {} for {user_id}", path.display());
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn load_mastery(&self, user_id: &str) -> MasteryMap {
        self.read_user(MASTERY_FILE, user_id)
    }

    fn save_mastery(&mut self, user_id: &str, mastery: &MasteryMap) {
        if let Err(e) = self.write_user(MASTERY_FILE, user_id, mastery) {
            warn!("Failed to save mastery for {user_id}: {e}");
        }
    }

    fn load_history(&self, user_id: &str) -> Vec<SessionSummary> {
        self.read_user(HISTORY_FILE, user_id)
    }

    fn save_history(&mut self, user_id: &str, history: &[SessionSummary]) {
        if let Err(e) = self.write_user(HISTORY_FILE, user_id, &history) {
            warn!("Failed to save history for {user_id}: {e}");
        }
    }
}

pub fn data_dir() -> StorageResult<PathBuf> {
    ProjectDirs::from("com", ORG_NAME, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MasteryConfig;
    use chrono::DateTime;

    fn summary(score: u32) -> SessionSummary {
        SessionSummary {
            date: DateTime::from_timestamp_millis(0).unwrap(),
            level: 5,
            score,
            correct: 1,
            total: 2,
        }
    }

    #[test]
    fn missing_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested"));
        assert!(storage.load_mastery("ada").is_empty());
        assert!(storage.load_history("ada").is_empty());
    }

    #[test]
    fn corrupt_files_give_defaults_and_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MASTERY_FILE), "{not json").unwrap();
        let mut storage = JsonFileStorage::new(dir.path());
        assert!(storage.load_mastery("ada").is_empty());

        let mut map = MasteryMap::new();
        map.record_attempt(2, 3, true, 500, 0, &MasteryConfig::default());
        storage.save_mastery("ada", &map);
        assert_eq!(storage.load_mastery("ada"), map);

        let backup = fs::read_to_string(dir.path().join("mastery.json.corrupt")).unwrap();
        assert_eq!(backup, "{not json");
    }

    #[test]
    fn bad_entry_only_affects_its_user() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path());
        let config = MasteryConfig::default();

        let mut bo = MasteryMap::new();
        bo.record_attempt(6, 7, true, 500, 0, &config);
        storage.save_mastery("bo", &bo);

        let path = dir.path().join(MASTERY_FILE);
        let mut all: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        all.insert(
            "ada".to_string(),
            serde_json::json!({"1x1": {"attempts": "oops"}}),
        );
        fs::write(&path, serde_json::to_string(&all).unwrap()).unwrap();

        assert!(storage.load_mastery("ada").is_empty());
        assert_eq!(storage.load_mastery("bo"), bo);

        let mut ada = MasteryMap::new();
        ada.record_attempt(2, 9, false, 500, 0, &config);
        storage.save_mastery("ada", &ada);

        assert_eq!(storage.load_mastery("bo"), bo);
        assert_eq!(storage.load_mastery("ada"), ada);
    }

    #[test]
    fn users_are_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path());
        let config = MasteryConfig::default();

        let mut ada = MasteryMap::new();
        ada.record_attempt(3, 4, false, 500, 0, &config);
        let mut bo = MasteryMap::new();
        bo.record_attempt(6, 6, true, 500, 0, &config);

        storage.save_mastery("ada", &ada);
        storage.save_mastery("bo", &bo);
        storage.save_history("bo", &[summary(40), summary(30)]);

        let reopened = JsonFileStorage::new(dir.path());
        assert_eq!(reopened.load_mastery("ada"), ada);
        assert_eq!(reopened.load_mastery("bo"), bo);
        assert!(reopened.load_history("ada").is_empty());
        let scores: Vec<u32> = reopened.load_history("bo").iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![40, 30]);
    }

    #[test]
    fn memory_storage_counts_writes() {
        let mut storage = MemoryStorage::new();
        storage.save_mastery("ada", &MasteryMap::new());
        assert_eq!(storage.mastery_writes, 1);
        assert!(storage.load_history("ada").is_empty());
    }
}
