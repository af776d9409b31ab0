//! Tier manifests
//!
//! A manifest is the flat descriptor list for every shard of one tier,
//! rebuilt wholesale from the on-disk tree after each rotation. Downstream
//! page generation depends on the global and parent-level shards, so those
//! are flagged critical and verified after every rebuild.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GazetaError, Result};
use crate::shard::{self, page_count, Tier};
use crate::store::{paths, ShardStore};

/// One shard descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the tier root, forward-slashed
    pub path: String,
    pub parent: String,
    pub child: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub items: usize,
    pub pages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<String>,
    /// The `(index, index)` shard
    #[serde(default)]
    pub is_global: bool,
    /// Absence or emptiness of this shard breaks page generation
    #[serde(default)]
    pub critical: bool,
}

/// Flat descriptor list for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Latest item date observed, kept instead of wall clock so unchanged
    /// content produces identical bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub per_page: usize,
    pub total_items: usize,
    pub shards: Vec<ManifestEntry>,
}

impl Manifest {
    /// Entries matching a scope exactly, newest bucket first
    pub fn entries_for_scope(&self, parent: &str, child: &str) -> Vec<&ManifestEntry> {
        let mut entries: Vec<&ManifestEntry> = self
            .shards
            .iter()
            .filter(|e| e.parent == parent && e.child == child)
            .collect();
        entries.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        entries
    }

    /// Reject missing or zero-byte critical shard files.
    ///
    /// Runs against the live store rather than the manifest's own counts so
    /// a truncated file that appeared after the scan is still caught.
    pub fn verify_critical(&self, store: &dyn ShardStore, tier: Tier) -> Result<()> {
        for entry in self.shards.iter().filter(|e| e.critical) {
            let rel = PathBuf::from(&entry.path);
            match store.shard_size(tier, &rel) {
                Some(size) if size > 0 => {}
                _ => {
                    return Err(GazetaError::MissingCriticalIndex { path: rel });
                }
            }
        }
        Ok(())
    }

    /// Compare declared item counts against the shards on disk.
    ///
    /// Returns one message per mismatch; an empty list means the manifest
    /// faithfully describes the tree.
    pub fn fidelity_issues(&self, store: &dyn ShardStore, tier: Tier) -> Result<Vec<String>> {
        let mut issues = Vec::new();
        for entry in &self.shards {
            let rel = PathBuf::from(&entry.path);
            let actual = store.read_items(tier, &rel)?.len();
            if actual != entry.items {
                issues.push(format!(
                    "{}: manifest declares {} items, shard holds {}",
                    entry.path, entry.items, actual
                ));
            }
        }
        Ok(issues)
    }
}

/// Build the manifest for a tier from its on-disk state.
///
/// Corrupt shards surface as zero-item entries (already logged by the
/// store) instead of disappearing, because a manifest omission would make
/// the scope invisible to the resolver.
pub fn build_manifest(store: &dyn ShardStore, tier: Tier, per_page: usize) -> Result<Manifest> {
    let mut entries = Vec::new();
    let mut total_items = 0usize;
    let mut latest_seen: Option<chrono::NaiveDate> = None;

    for rel in store.list_shards(tier)? {
        let mut items = store.read_items(tier, &rel)?;
        items = shard::dedupe_items(items);
        shard::sort_items(&mut items);

        let count = items.len();
        total_items += count;
        let first = shard::earliest_date(&items);
        let last = shard::latest_date(&items);
        if let Some(last) = last {
            if latest_seen.is_none_or(|seen| last > seen) {
                latest_seen = Some(last);
            }
        }

        let (scope, bucket) = match tier {
            Tier::Hot => (paths::parse_hot_rel(&rel), None),
            Tier::Archive => {
                let (scope, bucket) = paths::parse_archive_rel(&rel);
                (scope, Some(bucket))
            }
        };

        let is_global = scope.is_root();
        entries.push(ManifestEntry {
            path: rel_display(&rel),
            parent: scope.parent.clone(),
            child: scope.child.clone(),
            year: bucket.map(|b| b.year),
            month: bucket.map(|b| b.month),
            items: count,
            pages: page_count(count, per_page),
            first_date: first.map(iso),
            last_date: last.map(iso),
            is_global,
            critical: is_global || scope.is_parent_level(),
        });
    }

    entries.sort_by(|a, b| {
        (&a.parent, &a.child, a.year, a.month).cmp(&(&b.parent, &b.child, b.year, b.month))
    });

    Ok(Manifest {
        generated_at: latest_seen.map(iso),
        per_page,
        total_items,
        shards: entries,
    })
}

fn iso(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn rel_display(rel: &Path) -> String {
    rel.iter()
        .filter_map(|part| part.to_str())
        .collect::<Vec<_>>()
        .join("/")
}

static SLUG_RE: OnceLock<Regex> = OnceLock::new();
static ARCHIVE_PATH_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("static regex"))
}

fn archive_path_re() -> &'static Regex {
    ARCHIVE_PATH_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9/-]+/\d{4}/\d{2}/index\.json$").expect("static regex")
    })
}

/// Structural validation of an archive manifest: kebab-case scope slugs and
/// the `<parent>/<child>/<yyyy>/<mm>/index.json` path grammar.
pub fn structure_issues(manifest: &Manifest) -> Vec<String> {
    let mut issues = Vec::new();
    for entry in &manifest.shards {
        for (label, value) in [("parent", &entry.parent), ("child", &entry.child)] {
            if !slug_re().is_match(value) {
                issues.push(format!("{}: {} '{}' is not kebab-case", entry.path, label, value));
            }
        }
        if !archive_path_re().is_match(&entry.path) {
            issues.push(format!("{}: path does not match archive grammar", entry.path));
        }
        if entry.year == Some(1970) && entry.month == Some(1) {
            issues.push(format!("{}: bucket segments did not parse", entry.path));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GazetaError;
    use crate::item::Item;
    use crate::store::MemShardStore;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    fn seeded_store() -> MemShardStore {
        let store = MemShardStore::new();
        store.put_shard(
            Tier::Hot,
            "travel/europe/index.json",
            vec![
                item(serde_json::json!({ "slug": "a", "date": "2024-02-01" })),
                item(serde_json::json!({ "slug": "b", "date": "2024-01-05" })),
            ],
        );
        store.put_shard(
            Tier::Hot,
            "travel/index.json",
            vec![item(serde_json::json!({ "slug": "c", "date": "2024-02-09" }))],
        );
        store.put_shard(Tier::Hot, "index.json", Vec::new());
        store
    }

    #[test]
    fn manifest_counts_and_flags() {
        let store = seeded_store();
        let manifest = build_manifest(&store, Tier::Hot, 12).unwrap();

        assert_eq!(manifest.total_items, 3);
        assert_eq!(manifest.generated_at.as_deref(), Some("2024-02-09"));
        assert_eq!(manifest.shards.len(), 3);

        let global = manifest.shards.iter().find(|e| e.is_global).unwrap();
        assert!(global.critical);
        assert_eq!(global.path, "index.json");

        let parent = manifest
            .shards
            .iter()
            .find(|e| e.parent == "travel" && e.child == "index")
            .unwrap();
        assert!(parent.critical);

        let leaf = manifest
            .shards
            .iter()
            .find(|e| e.child == "europe")
            .unwrap();
        assert!(!leaf.critical);
        assert_eq!(leaf.items, 2);
        assert_eq!(leaf.first_date.as_deref(), Some("2024-01-05"));
        assert_eq!(leaf.last_date.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn archive_entries_carry_buckets() {
        let store = MemShardStore::new();
        store.put_shard(
            Tier::Archive,
            "travel/europe/2024/01/index.json",
            vec![item(serde_json::json!({ "slug": "a", "date": "2024-01-05" }))],
        );
        let manifest = build_manifest(&store, Tier::Archive, 12).unwrap();
        let entry = &manifest.shards[0];
        assert_eq!(entry.year, Some(2024));
        assert_eq!(entry.month, Some(1));
        assert!(!entry.critical);
    }

    #[test]
    fn verify_critical_rejects_zero_byte_shards() {
        let store = seeded_store();
        let manifest = build_manifest(&store, Tier::Hot, 12).unwrap();
        manifest.verify_critical(&store, Tier::Hot).unwrap();

        store.mark_zero_byte(Tier::Hot, "travel/index.json");
        let err = manifest.verify_critical(&store, Tier::Hot).unwrap_err();
        assert!(matches!(err, GazetaError::MissingCriticalIndex { .. }));
    }

    #[test]
    fn fidelity_catches_count_drift() {
        let store = seeded_store();
        let mut manifest = build_manifest(&store, Tier::Hot, 12).unwrap();
        assert!(manifest.fidelity_issues(&store, Tier::Hot).unwrap().is_empty());

        manifest.shards[0].items += 5;
        let issues = manifest.fidelity_issues(&store, Tier::Hot).unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn structure_issues_flag_bad_slugs_and_epoch_buckets() {
        let store = MemShardStore::new();
        store.put_shard(
            Tier::Archive,
            "travel/europe/2024/01/index.json",
            vec![item(serde_json::json!({ "slug": "a", "date": "2024-01-05" }))],
        );
        store.put_shard(
            Tier::Archive,
            "travel/bad_slug/2024/xx/index.json",
            vec![item(serde_json::json!({ "slug": "b" }))],
        );
        let manifest = build_manifest(&store, Tier::Archive, 12).unwrap();
        let issues = structure_issues(&manifest);
        assert!(!issues.is_empty());
        assert!(issues.iter().any(|i| i.contains("kebab-case")));
        assert!(issues.iter().any(|i| i.contains("bucket segments")));
    }
}
