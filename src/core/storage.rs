// src/core/storage.rs
//! Client-local persisted key-value state: the auth token and saved jobs.
//! Plain JSON on disk, read and written synchronously, no expiry.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::core::http_client::TokenSource;

pub const TOKEN_KEY: &str = "token";
pub const SAVED_JOBS_KEY: &str = "savedJobs";

pub struct LocalStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl LocalStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store: {}", path.display()))?;
            match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring corrupt store {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(entries).context("Failed to serialize store")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace store: {}", self.path.display()))
    }
}

/// Bearer token kept between runs.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<LocalStore>,
}

impl TokenStore {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, Value::String(token.to_string()))?;
        info!("Session token stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }
}

impl TokenSource for TokenStore {
    fn token(&self) -> Option<String> {
        self.store.get_string(TOKEN_KEY).filter(|t| !t.is_empty())
    }
}

/// Candidate-local saved jobs. Ids keep insertion order and never repeat.
#[derive(Clone)]
pub struct BookmarkStore {
    store: Arc<LocalStore>,
}

impl BookmarkStore {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        if let Some(Value::Array(items)) = self.store.get(SAVED_JOBS_KEY) {
            for id in items.iter().filter_map(Value::as_str) {
                if !ids.iter().any(|existing| existing == id) {
                    ids.push(id.to_string());
                }
            }
        }
        ids
    }

    pub fn is_saved(&self, job_id: &str) -> bool {
        self.ids().iter().any(|id| id == job_id)
    }

    /// Returns `false` when the job was already saved.
    pub fn add(&self, job_id: &str) -> Result<bool> {
        let mut ids = self.ids();
        if ids.iter().any(|id| id == job_id) {
            return Ok(false);
        }
        ids.push(job_id.to_string());
        self.write(&ids)?;
        Ok(true)
    }

    /// Returns `false` when the job was not saved.
    pub fn remove(&self, job_id: &str) -> Result<bool> {
        let mut ids = self.ids();
        let before = ids.len();
        ids.retain(|id| id != job_id);
        if ids.len() == before {
            return Ok(false);
        }
        self.write(&ids)?;
        Ok(true)
    }

    /// Flip the bookmark and return whether the job is now saved.
    pub fn toggle(&self, job_id: &str) -> Result<bool> {
        if self.remove(job_id)? {
            Ok(false)
        } else {
            self.add(job_id)
        }
    }

    fn write(&self, ids: &[String]) -> Result<()> {
        let value = Value::Array(ids.iter().cloned().map(Value::String).collect());
        self.store.set(SAVED_JOBS_KEY, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_in(dir: &tempfile::TempDir) -> Arc<LocalStore> {
        Arc::new(LocalStore::open(dir.path().join("state/storage.json")).unwrap())
    }

    #[test]
    fn test_bookmarks_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let bookmarks = BookmarkStore::new(open_in(&dir));
        assert!(bookmarks.add("job-1").unwrap());
        assert!(bookmarks.add("job-7").unwrap());
        assert!(!bookmarks.add("job-1").unwrap());
        assert!(bookmarks.add("job-3").unwrap());

        let reloaded = BookmarkStore::new(open_in(&dir));
        assert_eq!(reloaded.ids(), vec!["job-1", "job-7", "job-3"]);
        assert!(reloaded.is_saved("job-7"));
    }

    #[test]
    fn test_toggle_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let bookmarks = BookmarkStore::new(open_in(&dir));

        assert!(bookmarks.toggle("job-2").unwrap());
        assert!(!bookmarks.toggle("job-2").unwrap());
        assert!(!bookmarks.remove("job-2").unwrap());
        assert!(bookmarks.ids().is_empty());
    }

    #[test]
    fn test_token_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(open_in(&dir));
        assert_eq!(tokens.token(), None);

        tokens.save("jwt-abc").unwrap();
        let reloaded = TokenStore::new(open_in(&dir));
        assert_eq!(reloaded.token().as_deref(), Some("jwt-abc"));

        reloaded.clear().unwrap();
        assert_eq!(TokenStore::new(open_in(&dir)).token(), None);
    }

    #[test]
    fn test_corrupt_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = LocalStore::open(&path).unwrap();
        assert!(store.get(TOKEN_KEY).is_none());
        store.set(TOKEN_KEY, Value::String("t".into())).unwrap();
        assert_eq!(LocalStore::open(&path).unwrap().get_string(TOKEN_KEY).as_deref(), Some("t"));
    }
}
