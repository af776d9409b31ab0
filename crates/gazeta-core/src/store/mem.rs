//! In-memory shard store for tests
//!
//! Mirrors `FsShardStore` semantics closely enough to exercise rotation and
//! resolution without a filesystem, including injectable write failures for
//! the per-scope failure isolation tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{GazetaError, Result};
use crate::item::Item;
use crate::manifest::Manifest;
use crate::shard::{ShardPayload, Tier};
use crate::summary::Summary;

use super::ShardStore;

#[derive(Debug, Default)]
struct MemState {
    shards: BTreeMap<(Tier, PathBuf), Vec<Item>>,
    manifests: BTreeMap<Tier, Manifest>,
    summaries: BTreeMap<Tier, Summary>,
    fail_writes: BTreeSet<PathBuf>,
    zero_byte: BTreeSet<(Tier, PathBuf)>,
}

/// In-memory `ShardStore` fake
#[derive(Debug, Default)]
pub struct MemShardStore {
    state: Mutex<MemState>,
}

impl MemShardStore {
    pub fn new() -> MemShardStore {
        MemShardStore::default()
    }

    /// Seed a shard directly
    pub fn put_shard(&self, tier: Tier, rel: impl Into<PathBuf>, items: Vec<Item>) {
        let mut state = self.state.lock().unwrap();
        state.shards.insert((tier, rel.into()), items);
    }

    /// Make every subsequent write to `rel` fail
    pub fn fail_writes_to(&self, rel: impl Into<PathBuf>) {
        self.state.lock().unwrap().fail_writes.insert(rel.into());
    }

    /// Mark a shard as present but zero bytes on disk
    pub fn mark_zero_byte(&self, tier: Tier, rel: impl Into<PathBuf>) {
        let rel = rel.into();
        let mut state = self.state.lock().unwrap();
        state.shards.insert((tier, rel.clone()), Vec::new());
        state.zero_byte.insert((tier, rel));
    }

    pub fn shard_items(&self, tier: Tier, rel: &Path) -> Option<Vec<Item>> {
        self.state
            .lock()
            .unwrap()
            .shards
            .get(&(tier, rel.to_path_buf()))
            .cloned()
    }

    pub fn manifest(&self, tier: Tier) -> Option<Manifest> {
        self.state.lock().unwrap().manifests.get(&tier).cloned()
    }

    pub fn summary(&self, tier: Tier) -> Option<Summary> {
        self.state.lock().unwrap().summaries.get(&tier).cloned()
    }
}

impl ShardStore for MemShardStore {
    fn list_shards(&self, tier: Tier) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .shards
            .keys()
            .filter(|(t, _)| *t == tier)
            .map(|(_, rel)| rel.clone())
            .collect())
    }

    fn read_items(&self, tier: Tier, rel: &Path) -> Result<Vec<Item>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .shards
            .get(&(tier, rel.to_path_buf()))
            .cloned()
            .unwrap_or_default())
    }

    fn shard_size(&self, tier: Tier, rel: &Path) -> Option<u64> {
        let state = self.state.lock().unwrap();
        let key = (tier, rel.to_path_buf());
        if !state.shards.contains_key(&key) {
            return None;
        }
        if state.zero_byte.contains(&key) {
            return Some(0);
        }
        Some(1)
    }

    fn write_shard(&self, tier: Tier, rel: &Path, payload: &ShardPayload) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes.contains(rel) {
            return Err(GazetaError::write_failure(
                "replace",
                rel.display(),
                "injected write failure",
            ));
        }
        let key = (tier, rel.to_path_buf());
        state.zero_byte.remove(&key);
        state.shards.insert(key, payload.items.clone());
        Ok(())
    }

    fn remove_shard(&self, tier: Tier, rel: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.shards.remove(&(tier, rel.to_path_buf()));
        Ok(())
    }

    fn read_manifest(&self, tier: Tier) -> Result<Option<Manifest>> {
        Ok(self.state.lock().unwrap().manifests.get(&tier).cloned())
    }

    fn write_manifest(&self, tier: Tier, manifest: &Manifest) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .manifests
            .insert(tier, manifest.clone());
        Ok(())
    }

    fn read_summary(&self, tier: Tier) -> Result<Option<Summary>> {
        Ok(self.state.lock().unwrap().summaries.get(&tier).cloned())
    }

    fn write_summary(&self, tier: Tier, summary: &Summary) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .summaries
            .insert(tier, summary.clone());
        Ok(())
    }
}
