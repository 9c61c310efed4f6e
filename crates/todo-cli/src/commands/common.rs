//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use todo_core::Config;
use todo_db::DuckDbStore;
use todo_migrate::Engine;

use crate::cli::GlobalArgs;

/// Load the configuration named by `--config`, or look in the project directory.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => Config::load_from_dir(&global.project_dir).context("Failed to load configuration"),
    }
}

/// Where the database lives, after applying the `--database` override.
///
/// Returns `None` for an in-memory database.
pub(crate) fn resolve_database_path(global: &GlobalArgs, config: &Config) -> Option<PathBuf> {
    match global.database.as_deref() {
        Some(":memory:") => None,
        Some(path) => {
            let path = Path::new(path);
            if path.is_absolute() {
                Some(path.to_path_buf())
            } else {
                Some(global.project_dir.join(path))
            }
        }
        None => config.database_path_absolute(&global.project_dir),
    }
}

/// Open the store the commands operate on.
pub(crate) fn open_store(global: &GlobalArgs, config: &Config) -> Result<DuckDbStore> {
    let Some(path) = resolve_database_path(global, config) else {
        log::debug!("Opening in-memory database");
        return DuckDbStore::in_memory().context("Failed to open in-memory database");
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    log::debug!("Opening database at {}", path.display());
    DuckDbStore::from_path(&path)
        .with_context(|| format!("Failed to open database: {}", path.display()))
}

/// Build an engine over the built-in migrations, configured from `todo.yml`.
pub(crate) fn build_engine(config: &Config) -> Result<Engine> {
    let registry = todo_migrate::units::registry().context("Invalid built-in migrations")?;
    Ok(Engine::from_config(registry, &config.migrations))
}

/// Calculate the maximum width for each column in a table.
fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.len());
            }
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the headers.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
