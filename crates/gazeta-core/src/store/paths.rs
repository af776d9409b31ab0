//! Shard tree path conventions
//!
//! Hot: `<hot-root>/<parent>/<child>/index.json`, with the child segment
//! omitted for `index` scopes and the bare root shard at
//! `<hot-root>/index.json`.
//!
//! Archive: `<archive-root>/<parent>/<child>/<yyyy>/<mm>/index.json`, with
//! literal `index` segments for parent-level and global scopes so the path
//! grammar stays regular.

use std::path::{Path, PathBuf};

use crate::scope::{Scope, INDEX};
use crate::shard::MonthBucket;

/// Shard file name at every level of the tree
pub const SHARD_FILE: &str = "index.json";

/// Manifest file name at each tier root
pub const MANIFEST_FILE: &str = "manifest.json";

/// Summary file name at each tier root
pub const SUMMARY_FILE: &str = "summary.json";

/// Relative path of the hot shard for a scope
pub fn hot_shard_rel(scope: &Scope) -> PathBuf {
    let mut path = PathBuf::new();
    if scope.parent != INDEX {
        path.push(&scope.parent);
        if scope.child != INDEX {
            path.push(&scope.child);
        }
    }
    path.push(SHARD_FILE);
    path
}

/// Relative path of the archive shard for a scope-month bucket
pub fn archive_shard_rel(scope: &Scope, bucket: MonthBucket) -> PathBuf {
    let (year, month) = bucket.segments();
    let mut path = PathBuf::from(&scope.parent);
    path.push(&scope.child);
    path.push(year);
    path.push(month);
    path.push(SHARD_FILE);
    path
}

fn rel_parts(rel: &Path) -> Vec<&str> {
    rel.iter().filter_map(|part| part.to_str()).collect()
}

/// Parse a hot shard's relative path into its scope
pub fn parse_hot_rel(rel: &Path) -> Scope {
    let parts = rel_parts(rel);
    Scope::from_hot_rel_parts(&parts)
}

/// Parse an archive shard's relative path into its scope and bucket.
///
/// Paths too shallow to carry a bucket, or with non-numeric year/month
/// segments, collapse to the global scope and the epoch bucket rather than
/// failing the scan; the manifest builder reports them.
pub fn parse_archive_rel(rel: &Path) -> (Scope, MonthBucket) {
    let parts = rel_parts(rel);
    if parts.len() < 4 {
        return (Scope::root(), MonthBucket::new(1970, 1));
    }

    let len = parts.len();
    let year = parts[len - 3].parse::<i32>();
    let month = parts[len - 2].parse::<u32>();
    let bucket = match (year, month) {
        (Ok(year), Ok(month)) if (1..=12).contains(&month) => MonthBucket::new(year, month),
        _ => MonthBucket::new(1970, 1),
    };

    let parent = parts[0].to_string();
    let child = parts[1..len - 3].join("/");
    let child = if child.is_empty() {
        INDEX.to_string()
    } else {
        child
    };
    (Scope { parent, child }, bucket)
}
