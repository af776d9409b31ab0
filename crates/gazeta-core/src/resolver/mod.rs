//! Tiered item resolution
//!
//! The read-path protocol: probe the hot shard for the scope, then the
//! archive months the summary advertises, then the legacy monolithic index.
//! Tiers are ordered strategies with early exit; a failure inside one tier
//! advances to the next instead of retrying. Every fetched shard is
//! memoized for the life of the resolver, which exists for one page view.

mod merge;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;

use crate::item::Item;
use crate::manifest::Manifest;
use crate::scope::{slugify, Scope, Taxonomy, INDEX};
use crate::shard::{dedupe_items, extract_items, sort_items, MonthBucket, Tier};
use crate::store::{paths, ShardStore};
use crate::summary::Summary;

pub use merge::merge_records;

/// Default bound on how many archive months a lookup walks
pub const ARCHIVE_LOOKBACK_MONTHS: usize = 12;

/// Which tier satisfied a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTier {
    Hot,
    Archive,
    Legacy,
}

impl ResolvedTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedTier::Hot => "hot",
            ResolvedTier::Archive => "archive",
            ResolvedTier::Legacy => "legacy",
        }
    }
}

/// A located item plus where it was found and its canonical location
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedItem {
    pub item: Item,
    pub tier: ResolvedTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<MonthBucket>,
    pub canonical: String,
}

/// One-page-view resolver over a shard store
pub struct Resolver<'a> {
    store: &'a dyn ShardStore,
    summary: Option<Summary>,
    manifest: Option<Manifest>,
    taxonomy: Taxonomy,
    legacy_index: Option<PathBuf>,
    origin: String,
    lookback_months: usize,
    cache: RefCell<HashMap<(Tier, PathBuf), Rc<Vec<Item>>>>,
    legacy_cache: RefCell<Option<Rc<Vec<Item>>>>,
}

impl<'a> Resolver<'a> {
    /// Build a resolver, loading the archive tier's discovery metadata.
    ///
    /// A missing or unreadable manifest/summary degrades archive lookups to
    /// "no results" rather than erroring the page.
    pub fn new(store: &'a dyn ShardStore, origin: impl Into<String>) -> Resolver<'a> {
        let summary = store.read_summary(Tier::Archive).unwrap_or_default();
        let manifest = store.read_manifest(Tier::Archive).unwrap_or_default();
        Resolver {
            store,
            summary,
            manifest,
            taxonomy: Taxonomy::empty(),
            legacy_index: None,
            origin: origin.into().trim_end_matches('/').to_string(),
            lookback_months: ARCHIVE_LOOKBACK_MONTHS,
            cache: RefCell::new(HashMap::new()),
            legacy_cache: RefCell::new(None),
        }
    }

    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn with_legacy_index(mut self, path: impl Into<PathBuf>) -> Self {
        self.legacy_index = Some(path.into());
        self
    }

    pub fn with_lookback(mut self, months: usize) -> Self {
        self.lookback_months = months;
        self
    }

    /// Locate one item by scope and slug.
    ///
    /// Probes hot, then archive, then legacy, stopping at the first full
    /// record. A hot listing stub (no body) does not short-circuit: the
    /// archive record supplies the content and the stub only fills fields
    /// the archive record lacks.
    pub fn resolve(&self, scope: &Scope, slug: &str) -> Option<ResolvedItem> {
        let wanted = slugify(slug);

        let hot = self.probe_hot(scope, &wanted);
        if let Some(item) = &hot {
            if item.has_body() {
                return Some(self.finish(item.clone(), ResolvedTier::Hot, None, scope));
            }
        }

        if let Some((archived, bucket)) = self.probe_archive(scope, &wanted) {
            let merged = match &hot {
                Some(stub) => merge_records(archived, stub),
                None => archived,
            };
            return Some(self.finish(merged, ResolvedTier::Archive, Some(bucket), scope));
        }

        if let Some(stub) = hot {
            return Some(self.finish(stub, ResolvedTier::Hot, None, scope));
        }

        let legacy = self.probe_legacy(scope, &wanted)?;
        Some(self.finish(legacy, ResolvedTier::Legacy, None, scope))
    }

    /// Items for a listing view of a scope, first tier with content wins
    pub fn resolve_list(&self, scope: &Scope) -> Vec<Item> {
        let hot = self.fetch(Tier::Hot, paths::hot_shard_rel(scope));
        if !hot.is_empty() {
            return (*hot).clone();
        }

        let mut collected = Vec::new();
        for bucket in self.archive_months(scope) {
            let rel = paths::archive_shard_rel(scope, bucket);
            collected.extend((*self.fetch(Tier::Archive, rel)).clone());
        }
        if !collected.is_empty() {
            let mut items = dedupe_items(collected);
            sort_items(&mut items);
            return items;
        }

        let mut items: Vec<Item> = (*self.fetch_legacy())
            .iter()
            .filter(|item| self.matches_scope(item, scope))
            .cloned()
            .collect();
        items = dedupe_items(items);
        sort_items(&mut items);
        items
    }

    fn probe_hot(&self, scope: &Scope, wanted: &str) -> Option<Item> {
        // Subcategory scoping is exact: a miss here never retries with the
        // parent's index shard.
        let items = self.fetch(Tier::Hot, paths::hot_shard_rel(scope));
        find_slug(&items, wanted)
    }

    fn probe_archive(&self, scope: &Scope, wanted: &str) -> Option<(Item, MonthBucket)> {
        let months = self
            .summary
            .as_ref()
            .map(|s| s.months_for(scope))
            .unwrap_or_default();

        if !months.is_empty() {
            for bucket in months.into_iter().take(self.lookback_months) {
                let rel = paths::archive_shard_rel(scope, bucket);
                if let Some(item) = find_slug(&self.fetch(Tier::Archive, rel), wanted) {
                    return Some((item, bucket));
                }
            }
            return None;
        }

        // No summary entry for the exact scope: walk the manifest directly,
        // newest bucket first.
        let manifest = self.manifest.as_ref()?;
        for entry in manifest.entries_for_scope(&scope.parent, &scope.child) {
            let (Some(year), Some(month)) = (entry.year, entry.month) else {
                continue;
            };
            let rel = PathBuf::from(&entry.path);
            if let Some(item) = find_slug(&self.fetch(Tier::Archive, rel), wanted) {
                return Some((item, MonthBucket::new(year, month)));
            }
        }
        None
    }

    fn probe_legacy(&self, scope: &Scope, wanted: &str) -> Option<Item> {
        self.fetch_legacy()
            .iter()
            .find(|item| item.normalized_slug() == wanted && !self.contradicts_scope(item, scope))
            .cloned()
    }

    fn archive_months(&self, scope: &Scope) -> Vec<MonthBucket> {
        let months = self
            .summary
            .as_ref()
            .map(|s| s.months_for(scope))
            .unwrap_or_default();
        months.into_iter().take(self.lookback_months).collect()
    }

    /// Memoized shard fetch; any failure reads as an empty shard so the
    /// chain advances to the next tier.
    fn fetch(&self, tier: Tier, rel: PathBuf) -> Rc<Vec<Item>> {
        let key = (tier, rel);
        if let Some(items) = self.cache.borrow().get(&key) {
            return Rc::clone(items);
        }
        let items = match self.store.read_items(key.0, &key.1) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(tier = %key.0, path = %key.1.display(), error = %err, "shard fetch failed; advancing");
                Vec::new()
            }
        };
        let items = Rc::new(items);
        self.cache.borrow_mut().insert(key, Rc::clone(&items));
        items
    }

    fn fetch_legacy(&self) -> Rc<Vec<Item>> {
        if let Some(items) = self.legacy_cache.borrow().as_ref() {
            return Rc::clone(items);
        }
        let items = Rc::new(self.read_legacy_index());
        *self.legacy_cache.borrow_mut() = Some(Rc::clone(&items));
        items
    }

    fn read_legacy_index(&self) -> Vec<Item> {
        let Some(path) = &self.legacy_index else {
            return Vec::new();
        };
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(value) => extract_items(value),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "malformed legacy index; ignoring");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    /// The item's own scope, via the taxonomy when it carries a category
    fn item_scope(&self, item: &Item) -> Option<Scope> {
        item.category_slug
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| self.taxonomy.scope_for(s))
    }

    fn matches_scope(&self, item: &Item, scope: &Scope) -> bool {
        if scope.is_root() {
            return true;
        }
        match self.item_scope(item) {
            Some(derived) => {
                derived.parent == scope.parent
                    && (scope.is_parent_level() || derived.child == scope.child)
            }
            None => false,
        }
    }

    /// Lenient variant for direct lookups: an unscoped legacy record can
    /// still satisfy a scoped query, but a contradicting one cannot.
    fn contradicts_scope(&self, item: &Item, scope: &Scope) -> bool {
        if scope.is_root() {
            return false;
        }
        match self.item_scope(item) {
            Some(derived) => {
                derived.parent != scope.parent
                    || (!scope.is_parent_level() && derived.child != scope.child)
            }
            None => false,
        }
    }

    fn finish(
        &self,
        item: Item,
        tier: ResolvedTier,
        bucket: Option<MonthBucket>,
        scope: &Scope,
    ) -> ResolvedItem {
        let canonical = self.canonical_url(&item, scope, bucket);
        ResolvedItem {
            item,
            tier,
            bucket,
            canonical,
        }
    }

    /// Canonical location: `origin/parent/child/yyyy/mm/slug/`, with the
    /// child segment rendered as `index` when the item has no subcategory.
    /// An explicit `canonical` field on the item always wins.
    pub fn canonical_url(
        &self,
        item: &Item,
        scope: &Scope,
        bucket: Option<MonthBucket>,
    ) -> String {
        if let Some(explicit) = item.canonical.as_deref() {
            if !explicit.trim().is_empty() {
                return explicit.trim().to_string();
            }
        }

        let derived = if scope.is_root() {
            self.item_scope(item).unwrap_or_else(Scope::root)
        } else {
            scope.clone()
        };
        let child = if derived.child.is_empty() {
            INDEX.to_string()
        } else {
            derived.child.clone()
        };

        let bucket = bucket
            .or_else(|| item.publish_date().map(MonthBucket::from_date))
            .unwrap_or(MonthBucket { year: 1970, month: 1 });
        let (year, month) = bucket.segments();

        format!(
            "{}/{}/{}/{}/{}/{}/",
            self.origin,
            derived.parent,
            child,
            year,
            month,
            item.normalized_slug()
        )
    }
}

fn find_slug(items: &[Item], wanted: &str) -> Option<Item> {
    items
        .iter()
        .find(|item| item.normalized_slug() == wanted)
        .cloned()
}

#[cfg(test)]
mod tests;
