//! `gazeta verify` command - manifest fidelity and archive structure checks

use gazeta_core::error::{GazetaError, Result};
use gazeta_core::manifest::structure_issues;
use gazeta_core::shard::Tier;
use gazeta_core::store::ShardStore;

use crate::cli::{Cli, OutputFormat, VerifyArgs};
use crate::commands::helpers::{load_context, CommandContext};

/// Execute the verify command
pub fn execute(cli: &Cli, args: &VerifyArgs) -> Result<()> {
    let ctx = load_context(cli, &args.store)?;

    let mut issues = Vec::new();
    for tier in [Tier::Hot, Tier::Archive] {
        check_tier(&ctx, tier, &mut issues)?;
    }

    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ok": issues.is_empty(),
                    "issues": issues,
                }))?
            );
        }
        OutputFormat::Human => {
            for issue in &issues {
                println!("{}", issue);
            }
            if !cli.quiet && issues.is_empty() {
                println!("ok");
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(GazetaError::InvalidTree {
            reason: format!("{} issue(s) found", issues.len()),
        })
    }
}

fn check_tier(ctx: &CommandContext, tier: Tier, issues: &mut Vec<String>) -> Result<()> {
    let manifest = match ctx.store.read_manifest(tier)? {
        Some(manifest) => manifest,
        None => {
            // A tier with shards but no manifest is invisible to readers.
            if !ctx.store.list_shards(tier)?.is_empty() {
                issues.push(format!("{}: shards present but no manifest", tier));
            }
            return Ok(());
        }
    };

    for issue in manifest.fidelity_issues(&ctx.store, tier)? {
        issues.push(format!("{}: {}", tier, issue));
    }
    if let Err(err) = manifest.verify_critical(&ctx.store, tier) {
        issues.push(format!("{}: {}", tier, err));
    }
    if tier == Tier::Archive {
        for issue in structure_issues(&manifest) {
            issues.push(format!("{}: {}", tier, issue));
        }
    }
    Ok(())
}
