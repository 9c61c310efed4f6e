//! Error types for the migration engine.

use crate::unit::Ordinal;
use thiserror::Error;
use todo_db::DbError;

/// Migration engine errors.
///
/// Setup failures (`LedgerSetup`, `LedgerRead`) are returned from
/// [`Engine::run`](crate::Engine::run) before any unit is visited. Failures
/// while applying a unit are reported as a [`Halt`](crate::Halt) instead.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Two change units share an ordinal (M001).
    #[error("[M001] Duplicate change unit ordinal {ordinal}: '{first}' and '{second}'")]
    DuplicateOrdinal {
        ordinal: Ordinal,
        first: String,
        second: String,
    },

    /// Ledger table could not be created or verified (M002).
    #[error("[M002] Failed to prepare ledger table '{table}': {source}")]
    LedgerSetup {
        table: String,
        #[source]
        source: DbError,
    },

    /// Ledger table could not be read (M003).
    #[error("[M003] Failed to read ledger table '{table}': {source}")]
    LedgerRead {
        table: String,
        #[source]
        source: DbError,
    },

    /// Ledger record could not be written (M004).
    #[error("[M004] Failed to record migration {ordinal} in '{table}': {source}")]
    LedgerWrite {
        table: String,
        ordinal: Ordinal,
        #[source]
        source: DbError,
    },

    /// Ledger holds a value that is not a valid ordinal (M005).
    #[error("[M005] Ledger table '{table}' holds invalid ordinal {value}")]
    CorruptLedger { table: String, value: i64 },

    /// No change unit is registered under this ordinal (M006).
    #[error("[M006] No change unit registered with ordinal {0}")]
    UnknownUnit(Ordinal),

    /// The unit already has a ledger record (M007).
    #[error("[M007] Migration {ordinal} ('{name}') is already recorded as applied")]
    AlreadyApplied { ordinal: Ordinal, name: String },

    /// Change unit declared with ordinal zero (M009).
    #[error("[M009] Change unit '{name}' has ordinal 0; ordinals start at 1")]
    ZeroOrdinal { name: String },

    /// Store error outside the ledger (M008).
    #[error("[M008] Store error: {0}")]
    Store(#[from] DbError),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Failure reason returned by a change unit's forward action.
#[derive(Error, Debug)]
pub enum ForwardError {
    /// SQL executed by the unit failed
    #[error("{0}")]
    Sql(#[from] duckdb::Error),

    /// The unit rejected the store state
    #[error("{0}")]
    Failed(String),
}
