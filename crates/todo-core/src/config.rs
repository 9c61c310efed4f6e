//! Configuration types and parsing for todo.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration from todo.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Schema migration settings
    #[serde(default)]
    pub migrations: MigrationsConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (file-based DuckDB or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the configured database lives only in memory
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }
}

/// Schema migration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    /// Name of the audit ledger table
    #[serde(default = "default_ledger_table")]
    pub table: String,

    /// Where the ledger write happens relative to a unit's transaction
    #[serde(default)]
    pub audit: AuditMode,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            table: default_ledger_table(),
            audit: AuditMode::default(),
        }
    }
}

/// Placement of the audit record write relative to the unit's transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// The record is written inside the unit's own transaction, so the unit's
    /// effect and its ledger entry commit together.
    #[default]
    SameTransaction,
    /// The record is written in a separate transaction once the unit has
    /// committed. A failure between the two leaves the schema ahead of the
    /// ledger until an operator marks the unit as applied.
    AfterCommit,
}

impl std::fmt::Display for AuditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditMode::SameTransaction => write!(f, "same_transaction"),
            AuditMode::AfterCommit => write!(f, "after_commit"),
        }
    }
}

const IN_MEMORY_PATH: &str = ":memory:";

const DEFAULT_DB_PATH: &str = "todo.duckdb";

const DEFAULT_LEDGER_TABLE: &str = "migrations";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_ledger_table() -> String {
    DEFAULT_LEDGER_TABLE.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    ///
    /// Looks for todo.yml or todo.yaml. A directory without either file runs
    /// on the built-in defaults.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("todo.yml");
        let yaml_path = dir.join("todo.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            log::debug!(
                "No todo.yml found in {}, using default configuration",
                dir.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        if !is_valid_identifier(&self.migrations.table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migrations.table '{}' must be a plain SQL identifier (letters, digits, underscores)",
                    self.migrations.table
                ),
            });
        }

        Ok(())
    }

    /// Absolute database path, resolved against the project root.
    ///
    /// Returns `None` for an in-memory database.
    pub fn database_path_absolute(&self, root: &Path) -> Option<PathBuf> {
        if self.database.is_in_memory() {
            return None;
        }
        let path = Path::new(&self.database.path);
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(root.join(path))
        }
    }
}

/// The ledger table name is interpolated into DDL, so only bare identifiers
/// are accepted.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
