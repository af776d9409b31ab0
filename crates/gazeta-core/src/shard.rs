//! Shards: bounded, ordered item collections
//!
//! A shard is the unit of storage: one JSON document holding every item for
//! a scope (hot tier) or for a scope-month bucket (archive tier). Shards
//! are rewritten wholesale; there are no in-place item edits.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::scope::Scope;

/// Storage tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hot,
    Archive,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hot => "hot",
            Tier::Archive => "archive",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(year, month)` archive bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn new(year: i32, month: u32) -> MonthBucket {
        MonthBucket { year, month }
    }

    pub fn from_date(date: NaiveDate) -> MonthBucket {
        MonthBucket {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Zero-padded directory segments: `("2024", "01")`
    pub fn segments(&self) -> (String, String) {
        (format!("{:04}", self.year), format!("{:02}", self.month))
    }
}

impl std::fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Page count for a total under a page size
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return total;
    }
    total.div_ceil(per_page)
}

/// Deduplicate items by identity fingerprint; on conflict the record with
/// the newest publish date wins (ties keep the earlier occurrence).
pub fn dedupe_items(items: Vec<Item>) -> Vec<Item> {
    let mut kept: Vec<Item> = Vec::with_capacity(items.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = item.fingerprint().digest();
        match index.get(&key) {
            None => {
                index.insert(key, kept.len());
                kept.push(item);
            }
            Some(&at) => {
                let existing = kept[at].publish_date();
                let candidate = item.publish_date();
                if candidate > existing {
                    kept[at] = item;
                }
            }
        }
    }
    kept
}

/// Sort items newest-first by (publish date, slug); stable for equal keys
pub fn sort_items(items: &mut [Item]) {
    items.sort_by(|a, b| {
        let key_a = (a.publish_date(), a.normalized_slug());
        let key_b = (b.publish_date(), b.normalized_slug());
        key_b.cmp(&key_a)
    });
}

/// Latest publish date across a set of items
pub fn latest_date(items: &[Item]) -> Option<NaiveDate> {
    items.iter().filter_map(Item::publish_date).max()
}

/// Earliest publish date across a set of items
pub fn earliest_date(items: &[Item]) -> Option<NaiveDate> {
    items.iter().filter_map(Item::publish_date).min()
}

/// Pagination metadata embedded in shard payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_items: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// On-disk shard document: `{ items, count, updated_at, pagination }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardPayload {
    pub items: Vec<Item>,
    #[serde(default)]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl ShardPayload {
    /// Build a payload with its metadata kept in sync with the item list
    pub fn new(items: Vec<Item>, per_page: usize) -> ShardPayload {
        let updated_at = latest_date(&items).map(|d| d.format("%Y-%m-%d").to_string());
        let count = items.len();
        ShardPayload {
            pagination: Some(Pagination {
                total_items: count,
                per_page,
                total_pages: page_count(count, per_page),
            }),
            count,
            updated_at,
            items,
        }
    }
}

/// Keys a shard document may hold its item list under
const ITEM_LIST_KEYS: &[&str] = &["items", "entries", "data", "posts"];

/// Extract the item list from a parsed shard document.
///
/// Accepts both a bare array and an object with the list under any of the
/// conventional keys. Entries that are not JSON objects are dropped with a
/// warning rather than poisoning the whole shard.
pub fn extract_items(payload: serde_json::Value) -> Vec<Item> {
    let list = match payload {
        serde_json::Value::Array(list) => list,
        serde_json::Value::Object(mut map) => {
            let mut found = Vec::new();
            for key in ITEM_LIST_KEYS {
                if let Some(serde_json::Value::Array(list)) = map.remove(*key) {
                    found = list;
                    break;
                }
            }
            found
        }
        _ => Vec::new(),
    };

    list.into_iter()
        .filter_map(|entry| match serde_json::from_value::<Item>(entry) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(error = %err, "skipping non-object shard entry");
                None
            }
        })
        .collect()
}

/// An in-memory shard
#[derive(Debug, Clone)]
pub struct Shard {
    pub scope: Scope,
    pub tier: Tier,
    pub bucket: Option<MonthBucket>,
    pub items: Vec<Item>,
    pub per_page: usize,
}

impl Shard {
    pub fn hot(scope: Scope, items: Vec<Item>, per_page: usize) -> Shard {
        Shard {
            scope,
            tier: Tier::Hot,
            bucket: None,
            items,
            per_page,
        }
    }

    pub fn archive(scope: Scope, bucket: MonthBucket, items: Vec<Item>, per_page: usize) -> Shard {
        Shard {
            scope,
            tier: Tier::Archive,
            bucket: Some(bucket),
            items,
            per_page,
        }
    }

    /// Deduplicate and re-sort the item list
    pub fn normalize(&mut self) {
        let items = std::mem::take(&mut self.items);
        self.items = dedupe_items(items);
        sort_items(&mut self.items);
    }

    pub fn pages(&self) -> usize {
        page_count(self.items.len(), self.per_page)
    }

    pub fn payload(&self) -> ShardPayload {
        ShardPayload::new(self.items.clone(), self.per_page)
    }
}
