//! CLI argument parsing for gazeta
//!
//! Global flags: --root, --format, --quiet, --verbose, --log-level,
//! --log-json. Subcommands carry their own storage overrides via
//! `StoreArgs` so each can run against an explicit tree.

mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use output::OutputFormat;

/// Gazeta - hot/archive rotation and tiered resolution for sharded news data
#[derive(Parser, Debug)]
#[command(name = "gazeta")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base directory the data tree and config are resolved against
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Verbose logging (gazeta=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Explicit log filter (overrides --verbose)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Storage tree overrides shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Config file path (default: <root>/gazeta.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hot tier root directory
    #[arg(long)]
    pub hot_dir: Option<PathBuf>,

    /// Archive tier root directory
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RotateArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Days of content kept in the hot tier
    ///
    /// Overrides both the config file and the HOT_RETENTION_DAYS
    /// environment variable; invalid env values are warned about and
    /// ignored rather than parsed strictly here.
    #[arg(long)]
    pub retention_days: Option<u32>,

    /// Pagination size for rebuilt shard metadata
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Evaluate retention against this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub current_date: Option<String>,

    /// Report what would move without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Scope to search: `parent/child`, a category slug, or `index`
    pub scope: String,

    /// Item slug (normalized before matching)
    pub slug: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Site origin for canonical URL derivation
    #[arg(long)]
    pub origin: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Scope to list: `parent/child`, a category slug, or `index`
    pub scope: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Page number, 1-based
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Items per page
    #[arg(long)]
    pub per_page: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Pagination size for page counts
    #[arg(long)]
    pub per_page: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move aged items from hot shards into archive month buckets
    Rotate(RotateArgs),

    /// Resolve one item by scope and slug across storage tiers
    Resolve(ResolveArgs),

    /// List the items of a scope via the tiered resolver
    List(ListArgs),

    /// Rebuild manifests and summaries for both tiers without rotating
    Manifest(ManifestArgs),

    /// Check manifest fidelity and archive tree structure
    Verify(VerifyArgs),
}
