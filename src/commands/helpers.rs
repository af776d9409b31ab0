//! Shared command plumbing: config loading and store construction

use std::path::PathBuf;

use gazeta_core::config::Config;
use gazeta_core::error::Result;
use gazeta_core::resolver::Resolver;
use gazeta_core::scope::{Scope, Taxonomy};
use gazeta_core::store::FsShardStore;

use crate::cli::{Cli, StoreArgs};

/// Everything a command needs to run against one data tree
pub struct CommandContext {
    pub config: Config,
    pub store: FsShardStore,
    pub taxonomy: Taxonomy,
}

/// Resolve config and storage for a command: defaults, then `gazeta.toml`,
/// then environment, then the subcommand's own flags.
pub fn load_context(cli: &Cli, args: &StoreArgs) -> Result<CommandContext> {
    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut config = Config::load_or_default(args.config.as_deref(), &root)?;
    config.apply_env();
    let mut config = config.resolved_against(&root);

    if let Some(hot_dir) = &args.hot_dir {
        config.hot_dir = absolutize(&root, hot_dir);
    }
    if let Some(archive_dir) = &args.archive_dir {
        config.archive_dir = absolutize(&root, archive_dir);
    }

    let taxonomy = match &config.taxonomy {
        Some(path) if path.is_file() => match Taxonomy::load(path) {
            Ok(taxonomy) => taxonomy,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "taxonomy load failed; using empty mapping");
                Taxonomy::empty()
            }
        },
        _ => Taxonomy::empty(),
    };

    let store = FsShardStore::from_config(&config);
    Ok(CommandContext {
        config,
        store,
        taxonomy,
    })
}

impl CommandContext {
    /// Derive the scope for a CLI scope argument via the taxonomy
    pub fn scope_for(&self, reference: &str) -> Scope {
        self.taxonomy.scope_for(reference)
    }

    /// Build a resolver over this context's store and config
    pub fn resolver(&self, origin: Option<&str>) -> Resolver<'_> {
        let origin = origin
            .map(str::to_string)
            .or_else(|| self.config.origin.clone())
            .unwrap_or_default();

        let mut resolver = Resolver::new(&self.store, origin).with_taxonomy(self.taxonomy.clone());
        if self.config.legacy_index.is_file() {
            resolver = resolver.with_legacy_index(&self.config.legacy_index);
        }
        resolver
    }
}

fn absolutize(root: &std::path::Path, path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
