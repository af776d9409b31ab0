use std::collections::HashMap;

use chrono::NaiveDate;

use crate::item::Item;
use crate::manifest::build_manifest;
use crate::rotation::{rotate, RotationOptions};
use crate::scope::{Scope, Taxonomy};
use crate::shard::{MonthBucket, Tier};
use crate::store::{MemShardStore, ShardStore};

use super::*;

const ORIGIN: &str = "https://news.example";

fn item(value: serde_json::Value) -> Item {
    serde_json::from_value(value).unwrap()
}

fn rotated_store() -> MemShardStore {
    let store = MemShardStore::new();
    store.put_shard(
        Tier::Hot,
        "travel/europe/index.json",
        vec![
            item(serde_json::json!({
                "slug": "lisbon-guide",
                "title": "Lisbon Guide",
                "body": "full guide text",
                "date": "2024-01-05"
            })),
            item(serde_json::json!({
                "slug": "porto-weekend",
                "title": "Porto Weekend",
                "body": "porto text",
                "date": "2024-02-25"
            })),
        ],
    );
    let options = RotationOptions {
        retention_days: 30,
        per_page: 12,
        now: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        dry_run: false,
    };
    rotate(&store, &options).unwrap();
    store
}

#[test]
fn hot_full_record_short_circuits() {
    let store = MemShardStore::new();
    store.put_shard(
        Tier::Hot,
        "travel/europe/index.json",
        vec![item(serde_json::json!({
            "slug": "porto-weekend",
            "body": "text",
            "date": "2024-02-25"
        }))],
    );

    let resolver = Resolver::new(&store, ORIGIN);
    let resolved = resolver
        .resolve(&Scope::new("travel", "europe"), "porto-weekend")
        .unwrap();
    assert_eq!(resolved.tier, ResolvedTier::Hot);
    assert_eq!(
        resolved.canonical,
        "https://news.example/travel/europe/2024/02/porto-weekend/"
    );
}

#[test]
fn archived_item_resolves_with_identical_content() {
    let store = rotated_store();
    let resolver = Resolver::new(&store, ORIGIN);

    let resolved = resolver
        .resolve(&Scope::new("travel", "europe"), "lisbon-guide")
        .unwrap();
    assert_eq!(resolved.tier, ResolvedTier::Archive);
    assert_eq!(resolved.bucket, Some(MonthBucket::new(2024, 1)));
    assert_eq!(resolved.item.body.as_deref(), Some("full guide text"));
    assert_eq!(
        resolved.canonical,
        "https://news.example/travel/europe/2024/01/lisbon-guide/"
    );
}

#[test]
fn hot_stub_merges_with_archived_record() {
    let store = rotated_store();
    // A fresh listing write put a stub for the archived slug back into hot.
    store.put_shard(
        Tier::Hot,
        "travel/europe/index.json",
        vec![item(serde_json::json!({
            "slug": "lisbon-guide",
            "title": "Lisbon Guide (updated)",
            "cover": "/img/lisbon.jpg",
            "date": "2024-01-05"
        }))],
    );

    let resolver = Resolver::new(&store, ORIGIN);
    let resolved = resolver
        .resolve(&Scope::new("travel", "europe"), "lisbon-guide")
        .unwrap();
    assert_eq!(resolved.tier, ResolvedTier::Archive);
    // Archive wins content, stub fills the missing cover.
    assert_eq!(resolved.item.body.as_deref(), Some("full guide text"));
    assert_eq!(resolved.item.title.as_deref(), Some("Lisbon Guide"));
    assert_eq!(resolved.item.cover.as_deref(), Some("/img/lisbon.jpg"));
}

#[test]
fn subcategory_scoping_is_exact() {
    let store = rotated_store();
    let resolver = Resolver::new(&store, ORIGIN);

    assert!(resolver
        .resolve(&Scope::new("travel", "asia"), "lisbon-guide")
        .is_none());
    assert!(resolver
        .resolve(&Scope::parent_level("travel"), "lisbon-guide")
        .is_none());
}

#[test]
fn manifest_fallback_when_summary_is_absent() {
    let store = MemShardStore::new();
    store.put_shard(
        Tier::Archive,
        "travel/europe/2024/01/index.json",
        vec![item(serde_json::json!({
            "slug": "lisbon-guide",
            "body": "text",
            "date": "2024-01-05"
        }))],
    );
    let manifest = build_manifest(&store, Tier::Archive, 12).unwrap();
    store.write_manifest(Tier::Archive, &manifest).unwrap();

    let resolver = Resolver::new(&store, ORIGIN);
    let resolved = resolver
        .resolve(&Scope::new("travel", "europe"), "lisbon-guide")
        .unwrap();
    assert_eq!(resolved.tier, ResolvedTier::Archive);
    assert_eq!(resolved.bucket, Some(MonthBucket::new(2024, 1)));
}

#[test]
fn lookback_caps_the_months_walked() {
    let store = MemShardStore::new();
    store.put_shard(
        Tier::Hot,
        "travel/europe/index.json",
        vec![
            item(serde_json::json!({ "slug": "jan-story", "date": "2024-01-20" })),
            item(serde_json::json!({ "slug": "dec-story", "date": "2023-12-02" })),
        ],
    );
    let options = RotationOptions {
        retention_days: 30,
        per_page: 12,
        now: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        dry_run: false,
    };
    rotate(&store, &options).unwrap();

    let resolver = Resolver::new(&store, ORIGIN).with_lookback(1);
    assert!(resolver
        .resolve(&Scope::new("travel", "europe"), "dec-story")
        .is_none());

    let resolver = Resolver::new(&store, ORIGIN);
    assert!(resolver
        .resolve(&Scope::new("travel", "europe"), "dec-story")
        .is_some());
}

#[test]
fn legacy_index_is_the_last_resort() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("posts.json");
    std::fs::write(
        &legacy,
        serde_json::json!({
            "posts": [
                { "slug": "old-report", "title": "Old Report", "category_slug": "europe", "date": "2019-06-01" },
                { "slug": "older-note", "title": "Older Note", "date": "2018-03-01" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let mut groups = HashMap::new();
    groups.insert("europe".to_string(), "travel".to_string());
    let store = MemShardStore::new();
    let resolver = Resolver::new(&store, ORIGIN)
        .with_taxonomy(Taxonomy::from_map(groups))
        .with_legacy_index(&legacy);

    let resolved = resolver
        .resolve(&Scope::new("travel", "europe"), "old-report")
        .unwrap();
    assert_eq!(resolved.tier, ResolvedTier::Legacy);

    // A record whose own category contradicts the queried scope is skipped.
    assert!(resolver
        .resolve(&Scope::new("business", "markets"), "old-report")
        .is_none());

    // An unscoped legacy record still satisfies a scoped direct lookup.
    assert!(resolver
        .resolve(&Scope::new("travel", "europe"), "older-note")
        .is_some());
}

#[test]
fn explicit_canonical_wins() {
    let store = MemShardStore::new();
    store.put_shard(
        Tier::Hot,
        "travel/europe/index.json",
        vec![item(serde_json::json!({
            "slug": "syndicated",
            "body": "text",
            "canonical": "https://partner.example/original-story/",
            "date": "2024-02-25"
        }))],
    );

    let resolver = Resolver::new(&store, ORIGIN);
    let resolved = resolver
        .resolve(&Scope::new("travel", "europe"), "syndicated")
        .unwrap();
    assert_eq!(resolved.canonical, "https://partner.example/original-story/");
}

#[test]
fn list_prefers_hot_then_archive_then_legacy() {
    let store = rotated_store();
    let resolver = Resolver::new(&store, ORIGIN);
    let scope = Scope::new("travel", "europe");

    // Hot still holds the recent item, so the listing comes from hot alone.
    let listing = resolver.resolve_list(&scope);
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].slug, "porto-weekend");

    // Drain hot; the listing falls through to the archive months.
    store.put_shard(Tier::Hot, "travel/europe/index.json", Vec::new());
    let resolver = Resolver::new(&store, ORIGIN);
    let listing = resolver.resolve_list(&scope);
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].slug, "lisbon-guide");
}

#[test]
fn legacy_listing_is_scope_filtered() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("posts.json");
    std::fs::write(
        &legacy,
        serde_json::json!([
            { "slug": "a", "category_slug": "europe", "date": "2019-06-01" },
            { "slug": "b", "category_slug": "markets", "date": "2019-05-01" },
            { "slug": "c", "date": "2019-04-01" }
        ])
        .to_string(),
    )
    .unwrap();

    let mut groups = HashMap::new();
    groups.insert("europe".to_string(), "travel".to_string());
    groups.insert("markets".to_string(), "business".to_string());
    let store = MemShardStore::new();
    let resolver = Resolver::new(&store, ORIGIN)
        .with_taxonomy(Taxonomy::from_map(groups))
        .with_legacy_index(&legacy);

    let listing = resolver.resolve_list(&Scope::new("travel", "europe"));
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].slug, "a");

    // Root listing keeps everything, newest first.
    let all = resolver.resolve_list(&Scope::root());
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].slug, "a");
}

#[test]
fn resolver_tolerates_missing_metadata() {
    let store = MemShardStore::new();
    let resolver = Resolver::new(&store, ORIGIN);
    assert!(resolver
        .resolve(&Scope::new("travel", "europe"), "anything")
        .is_none());
    assert!(resolver.resolve_list(&Scope::root()).is_empty());
}
