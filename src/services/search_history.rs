//! Recent search terms, persisted client-side for autocomplete.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Storage key the terms live under.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";
pub const DEFAULT_LIMIT: usize = 5;

/// String key-value store, shaped like browser local storage.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;
    fn set(&self, key: &str, value: String) -> Result<(), ServiceError>;
    fn remove(&self, key: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, ServiceError> {
        self.entries
            .lock()
            .map_err(|_| ServiceError::StorageError("storage lock poisoned".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ServiceError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// All keys in one JSON object on disk. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ServiceError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), keys = entries.len(), "storage saved");
        Ok(())
    }

    fn update<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> R,
    ) -> Result<R, ServiceError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ServiceError::StorageError("storage lock poisoned".to_string()))?;
        let mut entries = self.load()?;
        let result = f(&mut entries);
        self.save(&entries)?;
        Ok(result)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), ServiceError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// Most recent first, unique ignoring case, capped at `limit`.
pub struct SearchHistory<S> {
    storage: S,
    limit: usize,
}

impl<S: KeyValueStorage> SearchHistory<S> {
    pub fn new(storage: S) -> Self {
        Self::with_limit(storage, DEFAULT_LIMIT)
    }

    pub fn with_limit(storage: S, limit: usize) -> Self {
        Self {
            storage,
            limit: limit.max(1),
        }
    }

    /// Stored terms. Unreadable data is treated as no history.
    pub fn terms(&self) -> Result<Vec<String>, ServiceError> {
        let Some(raw) = self.storage.get(RECENT_SEARCHES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(terms) => Ok(terms),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable recent searches");
                Ok(Vec::new())
            }
        }
    }

    fn store(&self, terms: &[String]) -> Result<(), ServiceError> {
        self.storage
            .set(RECENT_SEARCHES_KEY, serde_json::to_string(terms)?)
    }

    /// Records a search and returns the updated list. Blank terms are ignored.
    pub fn add(&self, term: &str) -> Result<Vec<String>, ServiceError> {
        let term = term.trim();
        if term.is_empty() {
            return self.terms();
        }

        let mut terms = self.terms()?;
        let lowered = term.to_lowercase();
        terms.retain(|existing| existing.to_lowercase() != lowered);
        terms.insert(0, term.to_string());
        terms.truncate(self.limit);

        self.store(&terms)?;
        Ok(terms)
    }

    /// Stored terms starting with `prefix`, ignoring case. An empty prefix
    /// returns everything.
    pub fn suggestions(&self, prefix: &str) -> Result<Vec<String>, ServiceError> {
        let prefix = prefix.trim().to_lowercase();
        Ok(self
            .terms()?
            .into_iter()
            .filter(|term| term.to_lowercase().starts_with(&prefix))
            .collect())
    }

    pub fn remove(&self, term: &str) -> Result<Vec<String>, ServiceError> {
        let lowered = term.trim().to_lowercase();
        let mut terms = self.terms()?;
        terms.retain(|existing| existing.to_lowercase() != lowered);
        self.store(&terms)?;
        Ok(terms)
    }

    pub fn clear(&self) -> Result<(), ServiceError> {
        self.storage.remove(RECENT_SEARCHES_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_ignoring_case_and_keeps_latest_first() {
        let history = SearchHistory::new(MemoryStorage::new());
        history.add("arduino").unwrap();
        history.add("servo").unwrap();
        let terms = history.add("Arduino").unwrap();

        assert_eq!(terms, vec!["Arduino".to_string(), "servo".to_string()]);
    }

    #[test]
    fn caps_at_limit() {
        let history = SearchHistory::with_limit(MemoryStorage::new(), 3);
        for term in ["a", "b", "c", "d"] {
            history.add(term).unwrap();
        }
        assert_eq!(history.terms().unwrap(), vec!["d", "c", "b"]);
    }

    #[test]
    fn blank_terms_are_ignored() {
        let history = SearchHistory::new(MemoryStorage::new());
        history.add("   ").unwrap();
        assert!(history.terms().unwrap().is_empty());
    }

    #[test]
    fn suggestions_match_prefix() {
        let history = SearchHistory::new(MemoryStorage::new());
        for term in ["stepper motor", "servo", "Stepper driver"] {
            history.add(term).unwrap();
        }
        assert_eq!(
            history.suggestions("STEP").unwrap(),
            vec!["Stepper driver", "stepper motor"]
        );
    }

    #[test]
    fn corrupt_value_reads_as_empty() {
        let storage = MemoryStorage::new();
        storage
            .set(RECENT_SEARCHES_KEY, "{not json".to_string())
            .unwrap();
        let history = SearchHistory::new(storage);

        assert!(history.terms().unwrap().is_empty());
        assert_eq!(history.add("lidar").unwrap(), vec!["lidar"]);
    }

    #[test]
    fn remove_and_clear() {
        let history = SearchHistory::new(MemoryStorage::new());
        history.add("esp32").unwrap();
        history.add("jetson").unwrap();

        assert_eq!(history.remove("ESP32").unwrap(), vec!["jetson"]);
        history.clear().unwrap();
        assert!(history.terms().unwrap().is_empty());
    }
}
