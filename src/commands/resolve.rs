//! `gazeta resolve` command - tiered lookup of one item

use gazeta_core::error::Result;
use gazeta_core::resolver::ResolvedItem;

use crate::cli::{Cli, OutputFormat, ResolveArgs};
use crate::commands::helpers::load_context;

/// Execute the resolve command.
///
/// A miss is an empty result, not an error: the read path reports
/// `found: false` and exits 0.
pub fn execute(cli: &Cli, args: &ResolveArgs) -> Result<()> {
    let ctx = load_context(cli, &args.store)?;
    let resolver = ctx.resolver(args.origin.as_deref());

    let scope = ctx.scope_for(&args.scope);
    match resolver.resolve(&scope, &args.slug) {
        Some(resolved) => emit_found(cli, &resolved),
        None => emit_missing(cli, args),
    }
}

fn emit_found(cli: &Cli, resolved: &ResolvedItem) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "found": true,
                    "tier": resolved.tier,
                    "bucket": resolved.bucket,
                    "canonical": resolved.canonical,
                    "item": resolved.item,
                }))?
            );
        }
        OutputFormat::Human => {
            let item = &resolved.item;
            println!("{}", item.normalized_slug());
            if let Some(title) = &item.title {
                println!("  title: {}", title);
            }
            if let Some(date) = &item.date {
                println!("  date: {}", date);
            }
            println!("  tier: {}", resolved.tier.as_str());
            println!("  canonical: {}", resolved.canonical);
        }
    }
    Ok(())
}

fn emit_missing(cli: &Cli, args: &ResolveArgs) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "found": false }))?
            );
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!("not found: {} in {}", args.slug, args.scope);
            }
        }
    }
    Ok(())
}
