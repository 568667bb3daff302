//! Typed documents on top of the key-value store
//!
//! A document that is missing or fails to parse falls back to its default.
//! Store faults still propagate.

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::db::DocumentStore;
use crate::model::{AppConfig, HistoryEntry, Routine, SessionSnapshot, UserProfile};

pub mod keys {
    pub const PROFILE: &str = "profile";
    pub const ROUTINES: &str = "routines";
    pub const CONFIG: &str = "config";
    pub const HISTORY: &str = "history";
    pub const PROGRESS: &str = "progress";
}

pub struct Storage<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> Result<T> {
        let Some(json) = self.store.get(key)? else {
            return Ok(fallback);
        };
        match serde_json::from_str(&json) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key, error = %e, "Unreadable document, using default");
                Ok(fallback)
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)?;
        debug!(key, bytes = json.len(), "Document saved");
        Ok(())
    }

    pub fn profile(&self) -> Result<Option<UserProfile>> {
        self.load(keys::PROFILE, None)
    }

    pub fn save_profile(&mut self, profile: &UserProfile) -> Result<()> {
        self.save(keys::PROFILE, profile)
    }

    pub fn routines(&self) -> Result<Vec<Routine>> {
        self.load(keys::ROUTINES, Vec::new())
    }

    pub fn save_routines(&mut self, routines: &[Routine]) -> Result<()> {
        self.save(keys::ROUTINES, &routines)
    }

    pub fn config(&self) -> Result<AppConfig> {
        self.load(keys::CONFIG, AppConfig::default())
    }

    pub fn save_config(&mut self, config: &AppConfig) -> Result<()> {
        self.save(keys::CONFIG, config)
    }

    /// History in append order
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.load(keys::HISTORY, Vec::new())
    }

    pub fn save_history(&mut self, history: &[HistoryEntry]) -> Result<()> {
        self.save(keys::HISTORY, &history)
    }

    pub fn append_history(&mut self, entry: HistoryEntry) -> Result<()> {
        let mut history = self.history()?;
        crate::history::record(&mut history, entry);
        self.save_history(&history)
    }

    pub fn snapshot(&self) -> Result<Option<SessionSnapshot>> {
        self.load(keys::PROGRESS, None)
    }

    pub fn save_snapshot(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        self.save(keys::PROGRESS, snapshot)
    }

    pub fn clear_snapshot(&mut self) -> Result<()> {
        self.store.clear(keys::PROGRESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::NaiveDate;

    fn storage() -> Storage<MemoryStore> {
        Storage::new(MemoryStore::new())
    }

    fn entry(id: &str, date: &str, index: usize) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            routine_id: Some("r1".to_string()),
            routine_name: "Push".to_string(),
            routine_index: index,
        }
    }

    #[test]
    fn test_defaults_when_absent() {
        let s = storage();
        assert_eq!(s.profile().unwrap(), None);
        assert!(s.routines().unwrap().is_empty());
        assert_eq!(s.config().unwrap().active_routine_count, 3);
        assert!(s.history().unwrap().is_empty());
        assert_eq!(s.snapshot().unwrap(), None);
    }

    #[test]
    fn test_corrupt_documents_fall_back() {
        let mut s = storage();
        for key in [keys::PROFILE, keys::ROUTINES, keys::CONFIG, keys::HISTORY, keys::PROGRESS] {
            s.store_mut().set(key, "{not json").unwrap();
        }
        assert_eq!(s.profile().unwrap(), None);
        assert!(s.routines().unwrap().is_empty());
        assert_eq!(s.config().unwrap(), AppConfig::default());
        assert!(s.history().unwrap().is_empty());
        assert_eq!(s.snapshot().unwrap(), None);
    }

    #[test]
    fn test_wrong_shape_falls_back() {
        let mut s = storage();
        s.store_mut().set(keys::CONFIG, r#"{"activeRoutineCount":"many"}"#).unwrap();
        assert_eq!(s.config().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_append_history_keeps_order() {
        let mut s = storage();
        s.append_history(entry("a", "2024-01-02", 1)).unwrap();
        s.append_history(entry("b", "2024-01-01", 0)).unwrap();

        let ids: Vec<_> = s.history().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_history_json_field_names() {
        let mut s = storage();
        s.append_history(entry("a", "2024-01-02", 1)).unwrap();
        let raw = s.store().get(keys::HISTORY).unwrap().unwrap();
        assert!(raw.contains(r#""date":"2024-01-02""#));
        assert!(raw.contains(r#""routineIndex":1"#));
        assert!(raw.contains(r#""routineName":"Push""#));
    }

    #[test]
    fn test_snapshot_save_and_clear() {
        let mut s = storage();
        let snapshot = SessionSnapshot {
            routine_id: "r1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            exercise_index: 1,
            current_set: 2,
            sub_exercise_index: 0,
            saved_at: chrono::Utc::now(),
        };
        s.save_snapshot(&snapshot).unwrap();
        assert_eq!(s.snapshot().unwrap(), Some(snapshot));

        s.clear_snapshot().unwrap();
        assert_eq!(s.snapshot().unwrap(), None);
    }
}
