//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// todo-app - schema migrations for the todo database
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override database path (file path or :memory:)
    #[arg(short, long, global = true, env = "TODO_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending schema migrations
    Migrate(MigrateArgs),

    /// Show applied and pending migrations
    Status(StatusArgs),

    /// Record a migration as applied without running it
    MarkApplied(MarkAppliedArgs),

    /// Print the application version
    Version,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Migrate up to and including this migration number (default: latest)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub number: Option<u32>,

    /// Log the migrations that would run without applying them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the mark-applied command
#[derive(Args, Debug)]
pub struct MarkAppliedArgs {
    /// Migration number to record
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub number: u32,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
