//! `gazeta rotate` command - drain aged items into the archive

use chrono::NaiveDate;

use gazeta_core::error::{GazetaError, Result};
use gazeta_core::rotation::{rotate, RotationOptions, RotationReport};

use crate::cli::{Cli, OutputFormat, RotateArgs};
use crate::commands::helpers::load_context;

/// Execute the rotate command
pub fn execute(cli: &Cli, args: &RotateArgs) -> Result<()> {
    let ctx = load_context(cli, &args.store)?;

    let retention_days = args.retention_days.unwrap_or(ctx.config.retention_days);
    let per_page = args.per_page.unwrap_or(ctx.config.per_page);

    let mut options = RotationOptions::new(retention_days, per_page);
    options.dry_run = args.dry_run;
    if let Some(raw) = &args.current_date {
        options.now = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| GazetaError::invalid_value("--current-date", raw))?;
    }

    let report = rotate(&ctx.store, &options)?;
    emit(cli, &report)?;

    // Scope isolation keeps the run going so healthy scopes still publish,
    // but any failed write must reach the scheduler as a non-zero exit.
    if report.failed_scopes > 0 {
        return Err(GazetaError::Other(format!(
            "{} of {} scopes failed to rotate",
            report.failed_scopes, report.processed_shards
        )));
    }
    Ok(())
}

fn emit(cli: &Cli, report: &RotationReport) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Human => {
            eprintln!("{}", report.stats_line());
            if cli.quiet {
                return Ok(());
            }
            for scope in &report.scopes {
                match &scope.error {
                    Some(error) => eprintln!("  {}: FAILED ({})", scope.scope, error),
                    None if scope.archived > 0 => eprintln!(
                        "  {}: archived {} kept {}",
                        scope.scope, scope.archived, scope.kept
                    ),
                    None => {}
                }
            }
        }
    }
    Ok(())
}
