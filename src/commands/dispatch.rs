//! Command dispatch logic for gazeta

use std::time::Instant;

use gazeta_core::error::Result;

use crate::cli::{Cli, Commands};
use crate::commands;

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let result = match &cli.command {
        Commands::Rotate(args) => commands::rotate::execute(cli, args),
        Commands::Resolve(args) => commands::resolve::execute(cli, args),
        Commands::List(args) => commands::list::execute(cli, args),
        Commands::Manifest(args) => commands::manifest::execute(cli, args),
        Commands::Verify(args) => commands::verify::execute(cli, args),
    };

    tracing::debug!(elapsed = ?start.elapsed(), "command complete");
    result
}
