//! Tier summaries
//!
//! The summary is the nested parent → children → months tree the resolver
//! uses to decide which archive buckets to probe without scanning the
//! filesystem. It is a strict aggregation of the manifest: nothing appears
//! here that the manifest does not list.

use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;
use crate::scope::{Scope, INDEX};
use crate::shard::{page_count, MonthBucket};

/// Per-month rollup for one child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub items: usize,
    pub pages: usize,
}

/// One child bucket under a parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSummary {
    pub child: String,
    /// Display slug: `parent` when child is `index`, else `parent/child`
    pub slug: String,
    pub items: usize,
    pub pages: usize,
    /// Most-recent-first; empty for hot-tier summaries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<MonthSummary>,
}

/// One parent group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSummary {
    pub parent: String,
    pub items: usize,
    pub pages: usize,
    pub children: Vec<ChildSummary>,
}

/// Aggregated tier summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub per_page: usize,
    pub total_items: usize,
    pub parents: Vec<ParentSummary>,
}

impl Summary {
    /// Month buckets for an exact scope, most recent first.
    ///
    /// Exact means exact: a `(parent, child)` scope never falls back to the
    /// parent's `index` entry here; the resolver owns fallback policy.
    pub fn months_for(&self, scope: &Scope) -> Vec<MonthBucket> {
        self.parents
            .iter()
            .find(|p| p.parent == scope.parent)
            .and_then(|p| p.children.iter().find(|c| c.child == scope.child))
            .map(|child| {
                child
                    .months
                    .iter()
                    .map(|m| MonthBucket::new(m.year, m.month))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Aggregate a manifest into its summary tree
pub fn build_summary(manifest: &Manifest) -> Summary {
    let mut parents: Vec<ParentSummary> = Vec::new();

    for entry in &manifest.shards {
        let parent = match parents.iter_mut().find(|p| p.parent == entry.parent) {
            Some(parent) => parent,
            None => {
                parents.push(ParentSummary {
                    parent: entry.parent.clone(),
                    items: 0,
                    pages: 0,
                    children: Vec::new(),
                });
                parents.last_mut().expect("just pushed")
            }
        };
        parent.items += entry.items;

        let child = match parent.children.iter_mut().find(|c| c.child == entry.child) {
            Some(child) => child,
            None => {
                let slug = if entry.child == INDEX {
                    entry.parent.clone()
                } else {
                    format!("{}/{}", entry.parent, entry.child)
                };
                parent.children.push(ChildSummary {
                    child: entry.child.clone(),
                    slug,
                    items: 0,
                    pages: 0,
                    months: Vec::new(),
                });
                parent.children.last_mut().expect("just pushed")
            }
        };
        child.items += entry.items;

        if let (Some(year), Some(month)) = (entry.year, entry.month) {
            child.months.push(MonthSummary {
                year,
                month,
                items: entry.items,
                pages: entry.pages,
            });
        }
    }

    for parent in &mut parents {
        parent.pages = page_count(parent.items, manifest.per_page);
        parent.children.sort_by(|a, b| a.child.cmp(&b.child));
        for child in &mut parent.children {
            child.pages = page_count(child.items, manifest.per_page);
            child
                .months
                .sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        }
    }
    parents.sort_by(|a, b| a.parent.cmp(&b.parent));

    Summary {
        generated_at: manifest.generated_at.clone(),
        per_page: manifest.per_page,
        total_items: manifest.total_items,
        parents,
    }
}
