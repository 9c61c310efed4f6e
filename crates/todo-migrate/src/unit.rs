//! Change units: one forward-only schema change each.

use crate::error::ForwardError;
use duckdb::Connection;
use serde::Serialize;
use std::fmt;

/// Total-order key of a change unit. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ordinal(u32);

impl Ordinal {
    /// Create an ordinal, returning `None` for zero.
    pub const fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Convert a stored ledger value, rejecting zero, negatives and overflow.
    pub fn from_i64(value: i64) -> Option<Self> {
        u32::try_from(value).ok().and_then(Self::new)
    }

    /// The raw ordinal value
    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn as_i64(self) -> i64 {
        i64::from(self.0)
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

type ForwardFn = dyn Fn(&Connection) -> Result<(), ForwardError> + Send + Sync;

/// One versioned, forward-only schema change.
///
/// The forward action receives the connection of the transaction the engine
/// opened for it; everything it executes commits or rolls back as one.
pub struct ChangeUnit {
    ordinal: Ordinal,
    name: String,
    forward: Box<ForwardFn>,
}

impl ChangeUnit {
    /// Create a unit from an arbitrary forward action.
    pub fn new<F>(ordinal: Ordinal, name: impl Into<String>, forward: F) -> Self
    where
        F: Fn(&Connection) -> Result<(), ForwardError> + Send + Sync + 'static,
    {
        Self {
            ordinal,
            name: name.into(),
            forward: Box::new(forward),
        }
    }

    /// Create a unit whose forward action runs a batch of SQL statements.
    pub fn sql(ordinal: Ordinal, name: impl Into<String>, sql: &'static str) -> Self {
        Self::new(ordinal, name, move |conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
    }

    /// The unit's ordinal
    pub fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    /// The unit's human-readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the forward action against a transactional connection.
    pub fn apply(&self, conn: &Connection) -> Result<(), ForwardError> {
        (self.forward)(conn)
    }
}

impl fmt::Debug for ChangeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeUnit")
            .field("ordinal", &self.ordinal)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_rejects_zero() {
        assert!(Ordinal::new(0).is_none());
        assert_eq!(Ordinal::new(7).map(Ordinal::get), Some(7));
    }

    #[test]
    fn test_ordinal_from_i64() {
        assert_eq!(Ordinal::from_i64(3), Ordinal::new(3));
        assert!(Ordinal::from_i64(0).is_none());
        assert!(Ordinal::from_i64(-1).is_none());
        assert!(Ordinal::from_i64(i64::from(u32::MAX) + 1).is_none());
    }

    #[test]
    fn test_ordinal_display_is_padded() {
        assert_eq!(Ordinal::new(2).unwrap().to_string(), "002");
        assert_eq!(Ordinal::new(1234).unwrap().to_string(), "1234");
    }

    #[test]
    fn test_sql_unit_applies_batch() {
        let conn = Connection::open_in_memory().unwrap();
        let unit = ChangeUnit::sql(
            Ordinal::new(1).unwrap(),
            "create_t",
            "CREATE TABLE t (id INT); INSERT INTO t VALUES (1);",
        );

        unit.apply(&conn).unwrap();

        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn test_sql_unit_reports_sql_error() {
        let conn = Connection::open_in_memory().unwrap();
        let unit = ChangeUnit::sql(Ordinal::new(1).unwrap(), "broken", "CREATE TABLE (");
        assert!(matches!(unit.apply(&conn), Err(ForwardError::Sql(_))));
    }

    #[test]
    fn test_debug_omits_forward_action() {
        let unit = ChangeUnit::new(Ordinal::new(4).unwrap(), "noop", |_| Ok(()));
        let debug = format!("{unit:?}");
        assert!(debug.contains("noop"));
        assert!(debug.contains("ordinal"));
    }
}
