//! Rotation run reporting

use serde::Serialize;

/// Outcome of one scope's migration
#[derive(Debug, Clone, Serialize)]
pub struct ScopeOutcome {
    /// Scope display slug
    pub scope: String,
    /// Hot shard path relative to the tier root
    pub path: String,
    /// Items left in the hot shard
    pub kept: usize,
    /// Items moved to archive buckets
    pub archived: usize,
    /// Failure message when the scope's migration was aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate report for one rotation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RotationReport {
    pub processed_shards: usize,
    pub archived_items: usize,
    pub archive_buckets: usize,
    pub hot_items_remaining: usize,
    pub failed_scopes: usize,
    pub dry_run: bool,
    pub scopes: Vec<ScopeOutcome>,
}

impl RotationReport {
    /// One-line stats summary for scheduler logs
    pub fn stats_line(&self) -> String {
        format!(
            "[rotate] processed={} archived={} buckets={} hot_remaining={} failed={}",
            self.processed_shards,
            self.archived_items,
            self.archive_buckets,
            self.hot_items_remaining,
            self.failed_scopes
        )
    }
}
