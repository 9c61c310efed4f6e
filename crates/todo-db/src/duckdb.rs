//! DuckDB store implementation

use crate::error::{DbError, DbResult};
use crate::traits::Store;
use duckdb::Connection;
use std::path::Path;

/// DuckDB-backed store handle
///
/// Single-threaded: the migration engine owns the store exclusively for the
/// duration of a run, so no `Mutex` is needed.
pub struct DuckDbStore {
    conn: Connection,
    in_transaction: bool,
}

impl DuckDbStore {
    /// Create a new in-memory DuckDB store
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Open (or create) a DuckDB store at a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Wrap an already-open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }

    /// Whether a transaction is currently open
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Check if a table or view exists
    pub fn relation_exists(&self, name: &str) -> DbResult<bool> {
        // Handle schema-qualified names
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn run_control(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::TransactionError(format!("{sql} failed: {e}")))
    }
}

impl Store for DuckDbStore {
    fn connection(&self) -> &Connection {
        &self.conn
    }

    fn begin(&mut self) -> DbResult<()> {
        if self.in_transaction {
            return Err(DbError::TransactionError(
                "a transaction is already active".to_string(),
            ));
        }
        self.run_control("BEGIN TRANSACTION")?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> DbResult<()> {
        if !self.in_transaction {
            return Err(DbError::TransactionError(
                "COMMIT without an active transaction".to_string(),
            ));
        }
        self.in_transaction = false;
        if let Err(e) = self.run_control("COMMIT") {
            // A failed COMMIT leaves an aborted transaction behind
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(e);
        }
        Ok(())
    }

    fn rollback(&mut self) -> DbResult<()> {
        if !self.in_transaction {
            return Err(DbError::TransactionError(
                "ROLLBACK without an active transaction".to_string(),
            ));
        }
        self.in_transaction = false;
        self.run_control("ROLLBACK")
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
