//! Mark-applied command implementation

use anyhow::{Context, Result};
use todo_migrate::Ordinal;

use crate::cli::{GlobalArgs, MarkAppliedArgs};
use crate::commands::common::{build_engine, load_config, open_store};

/// Execute the mark-applied command
pub async fn execute(args: &MarkAppliedArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let engine = build_engine(&config)?;
    let mut store = open_store(global, &config)?;

    let ordinal = Ordinal::new(args.number)
        .with_context(|| format!("Invalid migration number: {}", args.number))?;
    let record = engine
        .mark_applied(&mut store, ordinal)
        .with_context(|| format!("Failed to mark migration {ordinal} as applied"))?;

    println!(
        "Recorded migration {} ({}) as applied at {}",
        record.ordinal,
        record.name,
        record.applied_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

#[cfg(test)]
#[path = "mark_applied_test.rs"]
mod tests;
