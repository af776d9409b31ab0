//! Identity fingerprints for deduplication
//!
//! A fingerprint is the stable key used to decide whether two payloads are
//! the same published unit. Field preference: `id`, then `slug`, then
//! `url`/`canonical`, then `guid`, then `title`+`date`. Each variant is
//! prefixed so that a slug can never collide with an id of the same text.

use sha2::{Digest, Sha256};

use super::Item;

/// A composite identity key for an item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derive the fingerprint for an item
    pub fn of(item: &Item) -> Fingerprint {
        if let Some(id) = non_empty(item.extra_str("id")) {
            return Fingerprint(format!("id::{}", id.to_lowercase()));
        }
        if let Some(slug) = non_empty(Some(item.slug.as_str())) {
            return Fingerprint(format!("slug::{}", slug.to_lowercase()));
        }
        for field in [item.canonical.as_deref(), item.url.as_deref()] {
            if let Some(url) = non_empty(field) {
                return Fingerprint(format!("url::{}", url));
            }
        }
        if let Some(guid) = non_empty(item.extra_str("guid")) {
            return Fingerprint(format!("guid::{}", guid));
        }
        if let Some(title) = non_empty(item.title.as_deref()) {
            let date = item.date.as_deref().unwrap_or("").trim();
            return Fingerprint(format!("title::{}@{}", title, date));
        }

        // Extremely sparse payload: fall back to its JSON representation so
        // distinct junk entries at least stay distinct.
        let raw = serde_json::to_string(item).unwrap_or_default();
        Fingerprint(format!("raw::{}", raw))
    }

    /// The composite key text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// sha256 hex digest of the key, used by the persistent dedup store
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
