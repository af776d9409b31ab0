//! Taxonomy scopes
//!
//! A scope is a `(parent, child)` pair identifying a content bucket. The
//! sentinel child `index` means "all children of parent", and
//! `(index, index)` is the global scope. Scope derivation consults the
//! taxonomy mapping before falling back to naive slug splitting.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Sentinel segment for "all children" / global scope
pub const INDEX: &str = "index";

/// A `(parent, child)` taxonomy key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    pub parent: String,
    pub child: String,
}

impl Scope {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Scope {
        Scope {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// The global `(index, index)` scope
    pub fn root() -> Scope {
        Scope::new(INDEX, INDEX)
    }

    /// A parent-level scope covering all children
    pub fn parent_level(parent: impl Into<String>) -> Scope {
        Scope::new(parent, INDEX)
    }

    pub fn is_root(&self) -> bool {
        self.parent == INDEX && self.child == INDEX
    }

    pub fn is_parent_level(&self) -> bool {
        self.child == INDEX
    }

    /// Display slug: `parent` for parent-level scopes, else `parent/child`
    pub fn slug(&self) -> String {
        if self.child == INDEX {
            self.parent.clone()
        } else {
            format!("{}/{}", self.parent, self.child)
        }
    }

    /// Derive a scope from the path segments of a hot shard, relative to
    /// the tier root and including the file name.
    ///
    /// `index.json` -> global; `travel/index.json` -> `(travel, index)`;
    /// deeper paths join the middle segments into the child slug.
    pub fn from_hot_rel_parts(parts: &[&str]) -> Scope {
        if parts.len() <= 1 {
            return Scope::root();
        }
        let parent = parts[0].to_string();
        if parts.len() == 2 {
            return Scope::parent_level(parent);
        }
        let child = parts[1..parts.len() - 1].join("/");
        if child.is_empty() {
            Scope::parent_level(parent)
        } else {
            Scope::new(parent, child)
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.parent, self.child)
    }
}

/// Normalize arbitrary text into a kebab-case slug
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// Category slug -> parent group mapping, loaded from `taxonomy.json`
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    groups: HashMap<String, String>,
}

impl Taxonomy {
    /// An empty taxonomy; scope derivation degrades to slug splitting
    pub fn empty() -> Taxonomy {
        Taxonomy::default()
    }

    pub fn from_map(groups: HashMap<String, String>) -> Taxonomy {
        Taxonomy { groups }
    }

    /// Load a taxonomy mapping from a JSON object file.
    ///
    /// Accepts either a flat `{ "category": "parent" }` object or the same
    /// map nested under a `"categories"` key.
    pub fn load(path: &Path) -> Result<Taxonomy> {
        let content = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let map = value
            .get("categories")
            .and_then(|v| v.as_object())
            .or_else(|| value.as_object());

        let mut groups = HashMap::new();
        if let Some(map) = map {
            for (category, parent) in map {
                if let Some(parent) = parent.as_str() {
                    groups.insert(slugify(category), slugify(parent));
                }
            }
        }
        Ok(Taxonomy { groups })
    }

    /// Parent group for a category slug, if mapped
    pub fn parent_of(&self, category_slug: &str) -> Option<&str> {
        self.groups.get(category_slug).map(String::as_str)
    }

    /// Derive the scope for a raw category reference.
    ///
    /// The taxonomy mapping wins; only unmapped references fall back to
    /// literal `parent/child` splitting, and a bare unmapped slug becomes a
    /// parent-level scope.
    pub fn scope_for(&self, reference: &str) -> Scope {
        let reference = reference.trim().trim_matches('/');
        if reference.is_empty() || reference == INDEX {
            return Scope::root();
        }

        if let Some((parent, child)) = reference.split_once('/') {
            let child = slugify(child);
            let parent = slugify(parent);
            if child.is_empty() || child == INDEX {
                return Scope::parent_level(parent);
            }
            return Scope::new(parent, child);
        }

        let category = slugify(reference);
        if let Some(parent) = self.parent_of(&category) {
            return Scope::new(parent.to_string(), category);
        }
        Scope::parent_level(category)
    }
}
