//! Migrate command implementation

use anyhow::{Context, Result};
use todo_migrate::{Ordinal, Target};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{build_engine, load_config, open_store};

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let engine = build_engine(&config)?;
    let mut store = open_store(global, &config)?;

    let target = match args.number {
        Some(n) => Target::Ordinal(
            Ordinal::new(n).with_context(|| format!("Invalid migration number: {n}"))?,
        ),
        None => Target::Latest,
    };

    let report = engine
        .run(&mut store, target, args.dry_run)
        .context("Migration run failed")?;

    let marker = if args.dry_run { "~" } else { "✓" };
    for unit in &report.visited {
        println!("  {} {} {}", marker, unit.ordinal, unit.name);
    }
    println!("{}", report.summary());

    if let Some(halt) = report.halt() {
        anyhow::bail!("{halt}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
