//! Shard storage
//!
//! The shard tree is the only persistence layer: shards, manifests, and
//! summaries are plain JSON files. `ShardStore` abstracts the tree so the
//! rotation engine and resolver can run against an in-memory fake in tests.

pub mod mem;
pub mod paths;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{GazetaError, Result};
use crate::item::Item;
use crate::manifest::Manifest;
use crate::shard::{extract_items, ShardPayload, Tier};
use crate::summary::Summary;

pub use mem::MemShardStore;
pub use paths::{MANIFEST_FILE, SHARD_FILE, SUMMARY_FILE};

/// Storage abstraction over one hot tree and one archive tree.
///
/// Shard paths are always relative to their tier root. Reads are tolerant:
/// a missing shard is an empty shard, and malformed JSON is logged and
/// treated as empty so one corrupt file cannot poison a whole run.
pub trait ShardStore {
    /// All shard paths in a tier, sorted for deterministic iteration
    fn list_shards(&self, tier: Tier) -> Result<Vec<PathBuf>>;

    /// Items of one shard; empty when missing or malformed
    fn read_items(&self, tier: Tier, rel: &Path) -> Result<Vec<Item>>;

    /// On-disk size of a shard file; `None` when missing
    fn shard_size(&self, tier: Tier, rel: &Path) -> Option<u64>;

    /// Atomically replace a shard
    fn write_shard(&self, tier: Tier, rel: &Path, payload: &ShardPayload) -> Result<()>;

    /// Remove a shard (absence is not an error)
    fn remove_shard(&self, tier: Tier, rel: &Path) -> Result<()>;

    fn read_manifest(&self, tier: Tier) -> Result<Option<Manifest>>;

    fn write_manifest(&self, tier: Tier, manifest: &Manifest) -> Result<()>;

    fn read_summary(&self, tier: Tier) -> Result<Option<Summary>>;

    fn write_summary(&self, tier: Tier, summary: &Summary) -> Result<()>;
}

/// Write a JSON document atomically: temp file in the same directory, then
/// rename over the destination. Skips the write when the rendered text is
/// byte-identical to what is already on disk, so repeated runs with
/// unchanged content leave mtimes (and diffs) alone.
pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<bool> {
    let text = serde_json::to_string_pretty(value)? + "\n";
    write_text_atomic(path, &text)
}

/// Atomic text replace; returns false when the file already matched
pub fn write_text_atomic(path: &Path, text: &str) -> Result<bool> {
    if let Ok(current) = std::fs::read_to_string(path) {
        if current == text {
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| GazetaError::write_failure("create", parent.display(), e))?;
    }

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, text)
        .map_err(|e| GazetaError::write_failure("write", tmp.display(), e))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| GazetaError::write_failure("replace", path.display(), e))?;
    Ok(true)
}

/// Filesystem-backed shard store
#[derive(Debug, Clone)]
pub struct FsShardStore {
    hot_root: PathBuf,
    archive_root: PathBuf,
}

impl FsShardStore {
    pub fn new(hot_root: impl Into<PathBuf>, archive_root: impl Into<PathBuf>) -> FsShardStore {
        FsShardStore {
            hot_root: hot_root.into(),
            archive_root: archive_root.into(),
        }
    }

    pub fn from_config(config: &Config) -> FsShardStore {
        FsShardStore::new(&config.hot_dir, &config.archive_dir)
    }

    /// Root directory of a tier
    pub fn tier_root(&self, tier: Tier) -> &Path {
        match tier {
            Tier::Hot => &self.hot_root,
            Tier::Archive => &self.archive_root,
        }
    }

    fn abs(&self, tier: Tier, rel: &Path) -> PathBuf {
        self.tier_root(tier).join(rel)
    }

    fn read_meta<T: serde::de::DeserializeOwned>(&self, tier: Tier, file: &str) -> Result<Option<T>> {
        let path = self.tier_root(tier).join(file);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "malformed metadata file; ignoring");
                Ok(None)
            }
        }
    }
}

impl ShardStore for FsShardStore {
    fn list_shards(&self, tier: Tier) -> Result<Vec<PathBuf>> {
        let root = self.tier_root(tier);
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut shards = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| GazetaError::Other(e.to_string()))?;
            if entry.file_type().is_file() && entry.file_name() == SHARD_FILE {
                if let Ok(rel) = entry.path().strip_prefix(root) {
                    shards.push(rel.to_path_buf());
                }
            }
        }
        shards.sort();
        Ok(shards)
    }

    fn read_items(&self, tier: Tier, rel: &Path) -> Result<Vec<Item>> {
        let path = self.abs(tier, rel);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value) => Ok(extract_items(value)),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "malformed shard; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn shard_size(&self, tier: Tier, rel: &Path) -> Option<u64> {
        std::fs::metadata(self.abs(tier, rel)).ok().map(|m| m.len())
    }

    fn write_shard(&self, tier: Tier, rel: &Path, payload: &ShardPayload) -> Result<()> {
        write_json_atomic(&self.abs(tier, rel), payload)?;
        Ok(())
    }

    fn remove_shard(&self, tier: Tier, rel: &Path) -> Result<()> {
        match std::fs::remove_file(self.abs(tier, rel)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn read_manifest(&self, tier: Tier) -> Result<Option<Manifest>> {
        self.read_meta(tier, MANIFEST_FILE)
    }

    fn write_manifest(&self, tier: Tier, manifest: &Manifest) -> Result<()> {
        write_json_atomic(&self.tier_root(tier).join(MANIFEST_FILE), manifest)?;
        Ok(())
    }

    fn read_summary(&self, tier: Tier) -> Result<Option<Summary>> {
        self.read_meta(tier, SUMMARY_FILE)
    }

    fn write_summary(&self, tier: Tier, summary: &Summary) -> Result<()> {
        write_json_atomic(&self.tier_root(tier).join(SUMMARY_FILE), summary)?;
        Ok(())
    }
}
