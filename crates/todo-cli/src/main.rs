//! todo-app CLI - schema migrations for the todo-app database

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{mark_applied, migrate, status, version};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::MarkApplied(args) => mark_applied::execute(args, &cli.global).await,
        cli::Commands::Version => version::execute().await,
    }
}

/// `RUST_LOG` wins over `--verbose` when both are set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .format_target(false)
        .init();
}
