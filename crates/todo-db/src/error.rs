//! Error types for todo-db

use thiserror::Error;

/// Store operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Transaction management error (D002)
    #[error("[D002] Transaction failed: {0}")]
    TransactionError(String),

    /// DuckDB driver error with preserved source chain (D003)
    #[error("[D003] DuckDB error: {0}")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::DuckDb(err)
    }
}
