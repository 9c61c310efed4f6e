//! Audit ledger: the append-only record of applied change units.
//!
//! The ledger is a single table (`migrations` by default) with one row per
//! applied ordinal. Rows are only ever inserted; this crate never updates or
//! deletes them.

use crate::error::{MigrateError, MigrateResult};
use crate::unit::Ordinal;
use chrono::{DateTime, Utc};
use duckdb::Connection;
use serde::Serialize;
use todo_db::DbError;

/// One applied change unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub ordinal: Ordinal,
    /// Name of the unit at the time it was applied
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// Ledger table accessor.
#[derive(Debug, Clone)]
pub struct AuditLedger {
    table: String,
}

impl Default for AuditLedger {
    fn default() -> Self {
        Self::new("migrations")
    }
}

impl AuditLedger {
    /// Ledger stored in `table`.
    ///
    /// The name is interpolated into SQL; callers pass a validated identifier
    /// (see `todo_core::Config`).
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Name of the ledger table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the ledger table if it does not exist yet.
    pub fn ensure_table(&self, conn: &Connection) -> MigrateResult<()> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                 ordinal    BIGINT    NOT NULL PRIMARY KEY,
                 name       VARCHAR   NOT NULL,
                 applied_at TIMESTAMP NOT NULL
             );",
            self.table
        ))
        .map_err(|e| self.setup_error(e.into()))
    }

    /// Highest recorded ordinal, or `None` when nothing has been applied.
    pub fn highest_applied(&self, conn: &Connection) -> MigrateResult<Option<Ordinal>> {
        let value: Option<i64> = conn
            .query_row(
                &format!("SELECT MAX(ordinal) FROM {}", self.table),
                [],
                |row| row.get(0),
            )
            .map_err(|e| self.read_error(e.into()))?;

        value.map(|v| self.ordinal(v)).transpose()
    }

    /// Every record, ascending by ordinal.
    pub fn applied(&self, conn: &Connection) -> MigrateResult<Vec<AuditRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT ordinal, name, epoch_us(applied_at) FROM {} ORDER BY ordinal",
                self.table
            ))
            .map_err(|e| self.read_error(e.into()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(|e| self.read_error(e.into()))?;

        let mut records = Vec::new();
        for row in rows {
            let (ordinal, name, micros) = row.map_err(|e| self.read_error(e.into()))?;
            records.push(AuditRecord {
                ordinal: self.ordinal(ordinal)?,
                name,
                applied_at: DateTime::from_timestamp_micros(micros).ok_or(
                    MigrateError::CorruptLedger {
                        table: self.table.clone(),
                        value: micros,
                    },
                )?,
            });
        }
        Ok(records)
    }

    /// Append a record for `ordinal`.
    pub fn record(
        &self,
        conn: &Connection,
        ordinal: Ordinal,
        name: &str,
        applied_at: DateTime<Utc>,
    ) -> MigrateResult<AuditRecord> {
        let micros = applied_at.timestamp_micros();
        conn.execute(
            &format!(
                "INSERT INTO {} (ordinal, name, applied_at) VALUES (?, ?, make_timestamp(?))",
                self.table
            ),
            duckdb::params![ordinal.as_i64(), name, micros],
        )
        .map_err(|e| MigrateError::LedgerWrite {
            table: self.table.clone(),
            ordinal,
            source: e.into(),
        })?;

        Ok(AuditRecord {
            ordinal,
            name: name.to_string(),
            // The column keeps microsecond precision
            applied_at: DateTime::from_timestamp_micros(micros).unwrap_or(applied_at),
        })
    }

    fn ordinal(&self, value: i64) -> MigrateResult<Ordinal> {
        Ordinal::from_i64(value).ok_or(MigrateError::CorruptLedger {
            table: self.table.clone(),
            value,
        })
    }

    fn setup_error(&self, source: DbError) -> MigrateError {
        MigrateError::LedgerSetup {
            table: self.table.clone(),
            source,
        }
    }

    fn read_error(&self, source: DbError) -> MigrateError {
        MigrateError::LedgerRead {
            table: self.table.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
