//! Persistent dedup store
//!
//! Maps identity fingerprints to first-seen metadata so ingestion never
//! re-admits content it has already published, across rotation cycles and
//! across jobs. Records are consulted but never overwritten; deleting the
//! store file forces full re-ingestion.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::item::Fingerprint;
use crate::store::write_json_atomic;

/// First-seen metadata for one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// ISO date of first ingestion
    pub first_seen: String,
}

/// The `seen_all.json`-style key-value store.
///
/// Lifecycle is explicit: `load` on start, `persist` on exit. Keys are the
/// sha256 digests of identity fingerprints, kept sorted so the file is
/// diff-stable.
#[derive(Debug)]
pub struct SeenStore {
    path: PathBuf,
    entries: BTreeMap<String, SeenRecord>,
    dirty: bool,
}

impl SeenStore {
    /// Load the store, treating a missing or malformed file as empty
    pub fn load(path: impl Into<PathBuf>) -> SeenStore {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, SeenRecord>>(&content) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "malformed seen store; starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        SeenStore {
            path,
            entries,
            dirty: false,
        }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(&fingerprint.digest())
    }

    /// Record an identity if unseen. Returns false (and changes nothing)
    /// when the identity is already present.
    pub fn record(
        &mut self,
        fingerprint: &Fingerprint,
        url: Option<&str>,
        title: Option<&str>,
        first_seen: &str,
    ) -> bool {
        let key = fingerprint.digest();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(
            key,
            SeenRecord {
                url: url.map(str::to_string),
                title: title.map(str::to_string),
                first_seen: first_seen.to_string(),
            },
        );
        self.dirty = true;
        true
    }

    /// Persist to disk atomically; a no-op when nothing changed
    pub fn persist(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        write_json_atomic(&self.path, &self.entries)?;
        self.dirty = false;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    fn fingerprint(value: serde_json::Value) -> Fingerprint {
        let item: Item = serde_json::from_value(value).unwrap();
        item.fingerprint()
    }

    #[test]
    fn record_then_contains_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen_all.json");

        let fp = fingerprint(serde_json::json!({ "slug": "lisbon-guide" }));
        let mut store = SeenStore::load(&path);
        assert!(!store.contains(&fp));
        assert!(store.record(&fp, Some("https://news.example/a"), Some("Lisbon"), "2024-01-05"));
        store.persist().unwrap();

        let reloaded = SeenStore::load(&path);
        assert!(reloaded.contains(&fp));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn record_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SeenStore::load(dir.path().join("seen_all.json"));

        let fp = fingerprint(serde_json::json!({ "slug": "lisbon-guide" }));
        assert!(store.record(&fp, Some("first"), None, "2024-01-05"));
        assert!(!store.record(&fp, Some("second"), None, "2024-02-01"));

        store.persist().unwrap();
        let reloaded = SeenStore::load(store.path());
        let record = reloaded.entries.values().next().unwrap();
        assert_eq!(record.url.as_deref(), Some("first"));
        assert_eq!(record.first_seen, "2024-01-05");
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen_all.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = SeenStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn distinct_urls_are_distinct_identities() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SeenStore::load(dir.path().join("seen_all.json"));

        let a = fingerprint(serde_json::json!({
            "title": "Storm Warning", "date": "2024-02-01",
            "url": "https://feeds.example/storm-a"
        }));
        let b = fingerprint(serde_json::json!({
            "title": "Storm Warning", "date": "2024-02-01",
            "url": "https://feeds.example/storm-b"
        }));

        assert!(store.record(&a, None, None, "2024-02-01"));
        assert!(store.record(&b, None, None, "2024-02-01"));
        assert_eq!(store.len(), 2);
    }
}
