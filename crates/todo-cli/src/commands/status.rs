//! Status command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{build_engine, load_config, open_store, print_table};

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let engine = build_engine(&config)?;
    let store = open_store(global, &config)?;

    let status = engine
        .status(&store)
        .context("Failed to read migration status")?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&status).context("Failed to serialize status to JSON")?;
        println!("{json}");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = status
        .units
        .iter()
        .map(|unit| {
            let applied_at = match unit.applied_at {
                Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                None if status.gaps.contains(&unit.ordinal) => "missing".to_string(),
                None => "pending".to_string(),
            };
            vec![unit.ordinal.to_string(), unit.name.clone(), applied_at]
        })
        .collect();
    print_table(&["MIGRATION", "NAME", "APPLIED AT"], &rows);

    println!();
    match status.highest_applied {
        Some(h) => println!("Latest applied: {h}"),
        None => println!("Latest applied: none"),
    }
    println!("Pending: {}", status.pending().count());

    for gap in &status.gaps {
        println!("Warning: migration {gap} is registered but was never recorded");
    }
    for record in &status.unknown {
        println!(
            "Warning: ledger '{}' records migration {} ({}) which is not registered",
            status.ledger_table, record.ordinal, record.name
        );
    }

    Ok(())
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
