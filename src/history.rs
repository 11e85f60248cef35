//! Active result set and persisted search history.
//!
//! The history maps each search term to its most recent result set and
//! remembers recency order. It is persisted as a JSON snapshot written
//! atomically (temp file plus rename) so a crash mid-write never leaves a
//! corrupt file behind. Callers that share a store across sessions wrap
//! it in a mutex; that lock is what serializes snapshot writes from
//! overlapping searches.

use crate::error::{FastFindError, Result};
use crate::types::{MatchRecord, ResultSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk snapshot layout. Entries are stored oldest-first so a reload
/// reproduces the recency order.
#[derive(Debug, Serialize, Deserialize)]
struct HistorySnapshot {
    saved_at: DateTime<Utc>,
    entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryEntry {
    term: String,
    results: ResultSet,
}

/// Durable mapping from search term to result set.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: HashMap<String, ResultSet>,
    /// Terms oldest-first; the map and this vector always agree.
    recency: Vec<String>,
    /// Snapshot path. None disables persistence entirely.
    location: Option<PathBuf>,
}

impl HistoryStore {
    /// Create an empty store persisting to `location`.
    pub fn new(location: Option<PathBuf>) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    /// Load the snapshot at `location` if one exists.
    ///
    /// A missing file yields an empty store; an unreadable or undecodable
    /// one fails with [`FastFindError::HistoryLoad`].
    pub fn load(location: Option<PathBuf>) -> Result<Self> {
        let Some(path) = location.as_deref() else {
            return Ok(Self::new(None));
        };
        if !path.exists() {
            return Ok(Self::new(location));
        }

        let raw = fs::read_to_string(path).map_err(|e| FastFindError::HistoryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let snapshot: HistorySnapshot =
            serde_json::from_str(&raw).map_err(|e| FastFindError::HistoryLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut store = Self::new(location);
        for entry in snapshot.entries {
            store.insert(&entry.term, entry.results);
        }
        log::debug!(
            "loaded {} history entries (snapshot from {})",
            store.len(),
            snapshot.saved_at
        );
        Ok(store)
    }

    /// Load the snapshot, falling back to an empty store on corruption.
    /// A broken history file must never take the host down.
    pub fn load_or_default(location: Option<PathBuf>) -> Self {
        match Self::load(location.clone()) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("{}; starting with empty history", e);
                Self::new(location)
            }
        }
    }

    /// Insert or overwrite the results for `term`, making it the most
    /// recent entry.
    pub fn insert(&mut self, term: &str, results: ResultSet) {
        self.recency.retain(|t| t != term);
        self.recency.push(term.to_string());
        self.entries.insert(term.to_string(), results);
    }

    pub fn get(&self, term: &str) -> Option<&ResultSet> {
        self.entries.get(term)
    }

    /// Terms most recent first.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.recency.iter().rev().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the snapshot to the configured location. A no-op without
    /// one.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = self.location.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let snapshot = HistorySnapshot {
            saved_at: Utc::now(),
            entries: self
                .recency
                .iter()
                .map(|term| HistoryEntry {
                    term: term.clone(),
                    results: self.entries[term].clone(),
                })
                .collect(),
        };

        // Temp file plus rename keeps the snapshot atomic.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&snapshot)?.as_bytes())?;
        fs::rename(&tmp, path)?;
        log::debug!("persisted {} history entries to {}", self.len(), path.display());
        Ok(())
    }
}

/// Resolve where the history snapshot lives.
///
/// Prefers the project directory when a project is active, otherwise a
/// package-scoped directory under the platform cache dir. None when no
/// filename is configured, which disables persistence.
pub fn resolve_history_path(
    project_root: Option<&Path>,
    history_file: Option<&str>,
) -> Option<PathBuf> {
    let file = history_file?;
    if let Some(root) = project_root {
        return Some(root.join(file));
    }
    dirs::cache_dir().map(|dir| dir.join("fastfind").join(file))
}

/// Owns the active navigable result set and the history store.
#[derive(Debug, Default)]
pub struct ResultStore {
    active: ResultSet,
    active_term: Option<String>,
    history: HistoryStore,
}

impl ResultStore {
    pub fn new(history: HistoryStore) -> Self {
        Self {
            active: Vec::new(),
            active_term: None,
            history,
        }
    }

    /// Store `results` as the active set, record them in the history,
    /// and persist the snapshot.
    ///
    /// A persistence failure is returned but the in-memory state is
    /// already updated; a completed search is not discarded because its
    /// snapshot could not be written.
    pub fn publish(&mut self, term: &str, results: ResultSet) -> Result<()> {
        self.history.insert(term, results.clone());
        self.active = results;
        self.active_term = Some(term.to_string());
        self.history.persist()
    }

    /// The `index`-th record of the active set.
    pub fn get(&self, index: usize) -> Result<&MatchRecord> {
        self.active
            .get(index)
            .ok_or(FastFindError::IndexOutOfRange {
                index,
                len: self.active.len(),
            })
    }

    pub fn active(&self) -> &[MatchRecord] {
        &self.active
    }

    pub fn active_term(&self) -> Option<&str> {
        self.active_term.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Make a past result set active again. Does not touch recency or
    /// the snapshot.
    pub fn recall(&mut self, term: &str) -> bool {
        match self.history.get(term) {
            Some(results) => {
                self.active = results.clone();
                self.active_term = Some(term.to_string());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, line_number: u64) -> MatchRecord {
        MatchRecord {
            filename: filename.to_string(),
            line_number,
            column: 0,
            match_length: 4,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let mut history = HistoryStore::new(None);
        history.insert("foo", vec![record("a.c", 1)]);

        assert_eq!(history.get("foo").unwrap()[0].filename, "a.c");
        assert!(history.get("bar").is_none());
    }

    #[test]
    fn reinsert_moves_term_to_most_recent() {
        let mut history = HistoryStore::new(None);
        history.insert("foo", vec![record("a.c", 1)]);
        history.insert("bar", vec![record("b.c", 2)]);
        history.insert("foo", vec![record("c.c", 3)]);

        let terms: Vec<_> = history.terms().collect();
        assert_eq!(terms, vec!["foo", "bar"]);
        assert_eq!(history.get("foo").unwrap()[0].filename, "c.c");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn persist_and_reload_reproduce_the_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = HistoryStore::new(Some(path.clone()));
        history.insert("foo", vec![record("a.c", 3), record("b.c", 9)]);
        history.insert("bar", vec![record("c.c", 1)]);
        history.persist().unwrap();

        let reloaded = HistoryStore::load(Some(path)).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("foo").unwrap().len(), 2);
        assert_eq!(reloaded.get("foo").unwrap()[1].line_number, 9);
        let terms: Vec<_> = reloaded.terms().collect();
        assert_eq!(terms, vec!["bar", "foo"]);
    }

    #[test]
    fn persistence_disabled_without_location() {
        let mut history = HistoryStore::new(None);
        history.insert("foo", vec![record("a.c", 1)]);
        history.persist().unwrap();
        assert!(HistoryStore::load(None).unwrap().is_empty());
    }

    #[test]
    fn missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::load(Some(dir.path().join("absent.json"))).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_snapshot_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{this is not json").unwrap();

        let err = HistoryStore::load(Some(path.clone())).unwrap_err();
        assert!(matches!(err, FastFindError::HistoryLoad { .. }));

        let fallback = HistoryStore::load_or_default(Some(path));
        assert!(fallback.is_empty());
    }

    #[test]
    fn resolve_prefers_project_directory() {
        let project = Path::new("/work/project");
        assert_eq!(
            resolve_history_path(Some(project), Some("h.json")),
            Some(PathBuf::from("/work/project/h.json"))
        );
        assert_eq!(resolve_history_path(Some(project), None), None);

        let fallback = resolve_history_path(None, Some("h.json")).unwrap();
        assert!(fallback.ends_with("fastfind/h.json"));
    }

    #[test]
    fn publish_replaces_active_set_and_updates_history() {
        let mut store = ResultStore::new(HistoryStore::new(None));
        store.publish("foo", vec![record("a.c", 1)]).unwrap();
        store.publish("bar", vec![record("b.c", 2), record("c.c", 3)]).unwrap();

        assert_eq!(store.active().len(), 2);
        assert_eq!(store.active_term(), Some("bar"));
        assert_eq!(store.history().len(), 2);
        assert_eq!(store.get(1).unwrap().filename, "c.c");
    }

    #[test]
    fn get_out_of_range_is_an_error() {
        let mut store = ResultStore::new(HistoryStore::new(None));
        store.publish("foo", vec![record("a.c", 1)]).unwrap();

        let err = store.get(1).unwrap_err();
        assert!(matches!(
            err,
            FastFindError::IndexOutOfRange { index: 1, len: 1 }
        ));
        assert!(store.get(0).is_ok());
    }

    #[test]
    fn recall_restores_a_past_result_set() {
        let mut store = ResultStore::new(HistoryStore::new(None));
        store.publish("foo", vec![record("a.c", 1)]).unwrap();
        store.publish("bar", vec![record("b.c", 2)]).unwrap();

        assert!(store.recall("foo"));
        assert_eq!(store.active_term(), Some("foo"));
        assert_eq!(store.active()[0].filename, "a.c");
        assert!(!store.recall("baz"));
    }
}
