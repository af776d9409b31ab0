//! `gazeta manifest` command - rebuild discovery metadata without rotating

use gazeta_core::error::Result;
use gazeta_core::manifest::build_manifest;
use gazeta_core::shard::Tier;
use gazeta_core::store::ShardStore;
use gazeta_core::summary::build_summary;

use crate::cli::{Cli, ManifestArgs, OutputFormat};
use crate::commands::helpers::load_context;

/// Execute the manifest command
pub fn execute(cli: &Cli, args: &ManifestArgs) -> Result<()> {
    let ctx = load_context(cli, &args.store)?;
    let per_page = args.per_page.unwrap_or(ctx.config.per_page);

    let mut tiers = Vec::new();
    for tier in [Tier::Hot, Tier::Archive] {
        let manifest = build_manifest(&ctx.store, tier, per_page)?;
        let summary = build_summary(&manifest);
        ctx.store.write_manifest(tier, &manifest)?;
        ctx.store.write_summary(tier, &summary)?;

        tracing::info!(tier = %tier, shards = manifest.shards.len(), items = manifest.total_items, "metadata rebuilt");
        tiers.push((tier, manifest));
    }

    match cli.format {
        OutputFormat::Json => {
            let report: Vec<_> = tiers
                .iter()
                .map(|(tier, manifest)| {
                    serde_json::json!({
                        "tier": tier,
                        "shards": manifest.shards.len(),
                        "total_items": manifest.total_items,
                        "generated_at": manifest.generated_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                for (tier, manifest) in &tiers {
                    println!(
                        "{}: {} shards, {} items",
                        tier,
                        manifest.shards.len(),
                        manifest.total_items
                    );
                }
            }
        }
    }
    Ok(())
}
