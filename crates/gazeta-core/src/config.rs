//! Runtime configuration for gazeta
//!
//! Values come from three layers, weakest first: built-in defaults, a
//! `gazeta.toml` config file, and the `HOT_RETENTION_DAYS` /
//! `HOT_PAGINATION_SIZE` environment variables. CLI flags override all of
//! them at the command layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default retention window for the hot tier, in days
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default pagination size, matching the public site's page size
pub const DEFAULT_PER_PAGE: usize = 12;

/// Config file name looked up in the data root
pub const CONFIG_FILE: &str = "gazeta.toml";

/// Environment variable overriding the retention window
pub const RETENTION_ENV: &str = "HOT_RETENTION_DAYS";

/// Environment variable overriding the pagination size
pub const PER_PAGE_ENV: &str = "HOT_PAGINATION_SIZE";

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Days of content kept in the hot tier before rotation
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Page size used for pagination counts
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Hot tier root directory
    #[serde(default = "default_hot_dir")]
    pub hot_dir: PathBuf,

    /// Archive tier root directory
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Legacy monolithic index consulted as a resolver fallback
    #[serde(default = "default_legacy_index")]
    pub legacy_index: PathBuf,

    /// Site origin used when deriving canonical URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Taxonomy mapping file (category slug -> parent group)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<PathBuf>,
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

fn default_hot_dir() -> PathBuf {
    PathBuf::from("data/hot")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("data/archive")
}

fn default_legacy_index() -> PathBuf {
    PathBuf::from("data/posts.json")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            retention_days: DEFAULT_RETENTION_DAYS,
            per_page: DEFAULT_PER_PAGE,
            hot_dir: default_hot_dir(),
            archive_dir: default_archive_dir(),
            legacy_index: default_legacy_index(),
            origin: None,
            taxonomy: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// An explicit `path` must exist; otherwise `<root>/gazeta.toml` is
    /// consulted and silently skipped when absent.
    pub fn load_or_default(path: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = root.join(CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Config::default())
    }

    /// Apply environment variable overrides.
    ///
    /// Invalid values are reported and ignored rather than aborting the run,
    /// since rotation is usually invoked unattended.
    pub fn apply_env(&mut self) {
        if let Some(days) = env_u32(RETENTION_ENV) {
            self.retention_days = days;
        }
        if let Some(per_page) = env_u32(PER_PAGE_ENV) {
            if per_page > 0 {
                self.per_page = per_page as usize;
            }
        }
    }

    /// Resolve tier directories against a base root
    pub fn resolved_against(&self, root: &Path) -> Config {
        let mut config = self.clone();
        config.hot_dir = resolve(root, &self.hot_dir);
        config.archive_dir = resolve(root, &self.archive_dir);
        config.legacy_index = resolve(root, &self.legacy_index);
        config.taxonomy = self.taxonomy.as_ref().map(|p| resolve(root, p));
        config
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn env_u32(name: &str) -> Option<u32> {
    let raw = std::env::var(name).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = raw, "invalid environment override; ignoring");
            None
        }
    }
}
