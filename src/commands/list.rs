//! `gazeta list` command - scope listings via the tiered resolver

use gazeta_core::error::{GazetaError, Result};
use gazeta_core::item::Item;
use gazeta_core::shard::page_count;

use crate::cli::{Cli, ListArgs, OutputFormat};
use crate::commands::helpers::load_context;

/// Execute the list command
pub fn execute(cli: &Cli, args: &ListArgs) -> Result<()> {
    if args.page == 0 {
        return Err(GazetaError::invalid_value("--page", "0 (pages are 1-based)"));
    }

    let ctx = load_context(cli, &args.store)?;
    let resolver = ctx.resolver(None);

    let scope = ctx.scope_for(&args.scope);
    let items = resolver.resolve_list(&scope);

    let per_page = args.per_page.unwrap_or(ctx.config.per_page);
    let total_items = items.len();
    let total_pages = page_count(total_items, per_page);
    let page_items = paginate(&items, args.page, per_page);

    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "scope": scope.slug(),
                    "page": args.page,
                    "per_page": per_page,
                    "total_items": total_items,
                    "total_pages": total_pages,
                    "items": page_items,
                }))?
            );
        }
        OutputFormat::Human => {
            for item in page_items {
                let date = item.date.as_deref().unwrap_or("----------");
                let title = item.title.as_deref().unwrap_or("");
                println!("{}  {}  {}", date, item.normalized_slug(), title);
            }
            if !cli.quiet {
                eprintln!(
                    "page {}/{} ({} items in {})",
                    args.page,
                    total_pages.max(1),
                    total_items,
                    scope.slug()
                );
            }
        }
    }
    Ok(())
}

fn paginate(items: &[Item], page: usize, per_page: usize) -> &[Item] {
    if per_page == 0 {
        return items;
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = (start + per_page).min(items.len());
    &items[start..end]
}
