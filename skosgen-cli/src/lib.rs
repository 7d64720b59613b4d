//! skosgen CLI library.
//!
//! Argument types, command handlers and output helpers behind the `skosgen`
//! binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

use cli::{Cli, Commands};
use commands::build::BuildArgs;

/// Dispatch a parsed [`Cli`] to its command handler.
pub fn run(cli: Cli) -> error::CliResult<()> {
    let config_path = cli.config.as_deref();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Build {
            primary,
            groups,
            collections,
            collection_tables,
            hierarchies,
            output,
            cleaned,
            changelog,
            overrides,
            created,
        } => commands::build::run(
            BuildArgs {
                primary: &primary,
                groups: &groups,
                collections: &collections,
                collection_tables: &collection_tables,
                hierarchies: &hierarchies,
                output: &output,
                cleaned: cleaned.as_deref(),
                changelog: &changelog,
                overrides: &overrides,
                created,
            },
            config_path,
            quiet,
        ),

        Commands::Clean {
            input,
            output,
            changelog,
            base_uri,
        } => commands::clean::run(
            &input,
            &output,
            &changelog,
            base_uri.as_deref(),
            config_path,
            quiet,
        ),

        Commands::Init { force, path } => commands::init::run(&path, force),
    }
}
