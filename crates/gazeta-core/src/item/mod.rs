//! Published items
//!
//! An item is one published unit as it appears inside a shard file. Shard
//! payloads come from many feed sources, so every field except `slug` is
//! optional and unknown fields are carried through untouched — rotation must
//! rewrite shards without dropping keys it does not understand.

pub mod date;
pub mod identity;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use date::DATE_FIELD_CANDIDATES;
pub use identity::Fingerprint;

/// One published unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Slug, unique within a scope after normalization
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,

    /// Raw category label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Raw subcategory label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    /// Composite `parent/child` slug, or a flat category slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_slug: Option<String>,

    /// Publish timestamp as stored (kept verbatim; parsed lazily)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Origin URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Precomputed permanent URL; wins over derived canonical locations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Fields this tool does not interpret, preserved on rewrite
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    /// Fetch a string field from the passthrough map
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Slug after normalization (case-folded, diacritics stripped,
    /// non-alphanumerics collapsed to hyphens)
    pub fn normalized_slug(&self) -> String {
        slug::slugify(&self.slug)
    }

    /// Identity fingerprint for deduplication
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }

    /// Publish date, consulting the candidate field list in order
    pub fn publish_date(&self) -> Option<NaiveDate> {
        for field in DATE_FIELD_CANDIDATES {
            let parsed = match *field {
                "date" => self.date.as_deref().and_then(date::parse_date_str),
                other => self.extra.get(other).and_then(date::parse_date_value),
            };
            if parsed.is_some() {
                return parsed;
            }
        }
        None
    }

    /// Whether the record carries full content rather than a listing stub
    pub fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_from(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unknown_fields_round_trip() {
        let raw = serde_json::json!({
            "slug": "lisbon-guide",
            "title": "Lisbon Guide",
            "date": "2024-01-05",
            "reading_time": 7,
            "tags": ["travel", "europe"]
        });
        let item = item_from(raw.clone());
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["reading_time"], 7);
        assert_eq!(back["tags"], serde_json::json!(["travel", "europe"]));
    }

    #[test]
    fn publish_date_prefers_date_field() {
        let item = item_from(serde_json::json!({
            "slug": "a",
            "date": "2024-01-05",
            "updated_at": "2024-03-01"
        }));
        assert_eq!(
            item.publish_date(),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn publish_date_falls_back_through_candidates() {
        let item = item_from(serde_json::json!({
            "slug": "a",
            "published_at": "2024-02-09T10:00:00Z"
        }));
        assert_eq!(
            item.publish_date(),
            NaiveDate::from_ymd_opt(2024, 2, 9)
        );
    }

    #[test]
    fn normalized_slug_strips_diacritics() {
        let item = item_from(serde_json::json!({ "slug": "Øresund  Bridge!" }));
        assert_eq!(item.normalized_slug(), "oresund-bridge");
    }

    #[test]
    fn stub_detection() {
        let stub = item_from(serde_json::json!({ "slug": "a", "body": "  " }));
        assert!(!stub.has_body());
        let full = item_from(serde_json::json!({ "slug": "a", "body": "text" }));
        assert!(full.has_body());
    }
}
