//! Rotation engine
//!
//! The periodic batch that drains aged items out of hot shards into
//! month-bucketed archive shards, then republishes the discovery metadata
//! for both tiers from their final on-disk state.
//!
//! Ordering matters for the no-loss invariant: archive buckets are written
//! before the trimmed hot shard, so an interrupted scope leaves items
//! duplicated across tiers (collapsed by the next run's dedup) rather than
//! gone. A failure in one scope never blocks the others.

mod report;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, Utc};

use crate::error::Result;
use crate::item::Item;
use crate::manifest::{build_manifest, Manifest};
use crate::scope::Scope;
use crate::shard::{dedupe_items, sort_items, MonthBucket, ShardPayload, Tier};
use crate::store::{paths, ShardStore};
use crate::summary::{build_summary, Summary};

pub use report::{RotationReport, ScopeOutcome};

/// Parameters for one rotation run
#[derive(Debug, Clone)]
pub struct RotationOptions {
    /// Days of content kept in the hot tier
    pub retention_days: u32,
    /// Page size for pagination counts
    pub per_page: usize,
    /// "Today" for retention evaluation, normally the UTC date
    pub now: NaiveDate,
    /// Inspect without writing anything back
    pub dry_run: bool,
}

impl RotationOptions {
    pub fn new(retention_days: u32, per_page: usize) -> RotationOptions {
        RotationOptions {
            retention_days,
            per_page,
            now: Utc::now().date_naive(),
            dry_run: false,
        }
    }
}

/// Run one rotation pass over the hot tier.
///
/// Returns the aggregate report; scope failures are collected in it rather
/// than propagated. Errors surface only for the run-level failures the
/// caller cannot ignore: the post-rotation critical index check and
/// metadata rebuild failures.
#[tracing::instrument(skip(store, options), fields(retention_days = options.retention_days, dry_run = options.dry_run))]
pub fn rotate(store: &dyn ShardStore, options: &RotationOptions) -> Result<RotationReport> {
    let cutoff = options.now - Duration::days(i64::from(options.retention_days));
    let mut report = RotationReport {
        dry_run: options.dry_run,
        ..RotationReport::default()
    };
    let mut touched: BTreeSet<PathBuf> = BTreeSet::new();

    for rel in store.list_shards(Tier::Hot)? {
        // The bare root index is an aggregate view, not a rotation source.
        if rel.iter().count() < 2 {
            continue;
        }
        let scope = paths::parse_hot_rel(&rel);
        report.processed_shards += 1;

        match rotate_scope(store, &rel, &scope, cutoff, options, &mut touched) {
            Ok(outcome) => {
                report.archived_items += outcome.archived;
                report.scopes.push(outcome);
            }
            Err(err) => {
                tracing::warn!(scope = %scope, error = %err, "scope migration aborted");
                report.failed_scopes += 1;
                report.scopes.push(ScopeOutcome {
                    scope: scope.slug(),
                    path: rel.display().to_string(),
                    kept: 0,
                    archived: 0,
                    error: Some(err.to_string()),
                });
            }
        }
    }
    report.archive_buckets = touched.len();

    let (hot_manifest, _) = rebuild_tier(store, Tier::Hot, options)?;
    let (archive_manifest, _) = rebuild_tier(store, Tier::Archive, options)?;
    report.hot_items_remaining = hot_manifest.total_items;

    if !options.dry_run {
        hot_manifest.verify_critical(store, Tier::Hot)?;
        archive_manifest.verify_critical(store, Tier::Archive)?;
    }

    tracing::info!(
        processed = report.processed_shards,
        archived = report.archived_items,
        buckets = report.archive_buckets,
        hot_remaining = report.hot_items_remaining,
        failed = report.failed_scopes,
        "rotation complete"
    );
    Ok(report)
}

/// Partition one hot shard and migrate its expirees.
fn rotate_scope(
    store: &dyn ShardStore,
    rel: &Path,
    scope: &Scope,
    cutoff: NaiveDate,
    options: &RotationOptions,
    touched: &mut BTreeSet<PathBuf>,
) -> Result<ScopeOutcome> {
    let items = store.read_items(Tier::Hot, rel)?;

    let mut keep: Vec<Item> = Vec::new();
    let mut expired: BTreeMap<MonthBucket, Vec<Item>> = BTreeMap::new();
    for item in items {
        match item.publish_date() {
            // Unparseable dates never expire; losing an item to a bad date
            // string would be worse than holding it in hot forever.
            Some(date) if date < cutoff => {
                expired.entry(MonthBucket::from_date(date)).or_default().push(item);
            }
            _ => keep.push(item),
        }
    }

    let archived: usize = expired.values().map(Vec::len).sum();

    // Archive buckets first: until the hot trim lands, an interrupted scope
    // holds items in both tiers, never in neither.
    for (bucket, new_items) in expired {
        let arel = paths::archive_shard_rel(scope, bucket);
        merge_archive_bucket(store, &arel, new_items, options)?;
        touched.insert(arel);
    }

    let mut keep = dedupe_items(keep);
    sort_items(&mut keep);
    let kept = keep.len();
    if !options.dry_run {
        store.write_shard(Tier::Hot, rel, &ShardPayload::new(keep, options.per_page))?;
    }

    if archived > 0 {
        tracing::debug!(scope = %scope, archived, kept, "scope rotated");
    }

    Ok(ScopeOutcome {
        scope: scope.slug(),
        path: rel.display().to_string(),
        kept,
        archived,
        error: None,
    })
}

/// Union new expirees into an existing archive bucket.
///
/// New items are listed before existing ones so that on a fingerprint tie
/// (same identity, same date) the incoming record wins the dedup.
fn merge_archive_bucket(
    store: &dyn ShardStore,
    rel: &Path,
    new_items: Vec<Item>,
    options: &RotationOptions,
) -> Result<()> {
    let existing = store.read_items(Tier::Archive, rel)?;
    let mut combined = new_items;
    combined.extend(existing);

    let mut merged = dedupe_items(combined);
    sort_items(&mut merged);

    if options.dry_run {
        return Ok(());
    }
    if merged.is_empty() {
        store.remove_shard(Tier::Archive, rel)
    } else {
        store.write_shard(Tier::Archive, rel, &ShardPayload::new(merged, options.per_page))
    }
}

/// Rebuild and publish a tier's manifest and summary from disk.
///
/// The rebuild only reads, so a transient failure is retried once before
/// giving up; shard writes are never retried.
fn rebuild_tier(
    store: &dyn ShardStore,
    tier: Tier,
    options: &RotationOptions,
) -> Result<(Manifest, Summary)> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match try_rebuild_tier(store, tier, options) {
            Ok(result) => return Ok(result),
            Err(err) if attempt == 1 => {
                tracing::warn!(tier = %tier, error = %err, "metadata rebuild failed; retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

fn try_rebuild_tier(
    store: &dyn ShardStore,
    tier: Tier,
    options: &RotationOptions,
) -> Result<(Manifest, Summary)> {
    let manifest = build_manifest(store, tier, options.per_page)?;
    let summary = build_summary(&manifest);
    if !options.dry_run {
        store.write_manifest(tier, &manifest)?;
        store.write_summary(tier, &summary)?;
    }
    Ok((manifest, summary))
}
