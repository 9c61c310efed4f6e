//! Store wrapper for tests: counts transaction calls and injects failures.

use crate::error::{DbError, DbResult};
use crate::traits::Store;
use duckdb::Connection;

/// Wraps another [`Store`], counting transaction primitives and optionally
/// failing the Nth commit.
pub struct InstrumentedStore<S: Store> {
    inner: S,
    /// Number of successful `begin` calls
    pub begins: usize,
    /// Number of `commit` calls, failed ones included
    pub commits: usize,
    /// Number of `rollback` calls
    pub rollbacks: usize,
    fail_commit_at: Option<usize>,
}

impl<S: Store> InstrumentedStore<S> {
    /// Wrap `inner` without any injected failure
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            begins: 0,
            commits: 0,
            rollbacks: 0,
            fail_commit_at: None,
        }
    }

    /// Make the `n`th commit (1-based) roll back and report a failure.
    pub fn fail_commit_at(mut self, n: usize) -> Self {
        self.fail_commit_at = Some(n);
        self
    }

    /// Borrow the wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the store
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Store> Store for InstrumentedStore<S> {
    fn connection(&self) -> &Connection {
        self.inner.connection()
    }

    fn begin(&mut self) -> DbResult<()> {
        self.inner.begin()?;
        self.begins += 1;
        Ok(())
    }

    fn commit(&mut self) -> DbResult<()> {
        self.commits += 1;
        if self.fail_commit_at == Some(self.commits) {
            self.inner.rollback()?;
            return Err(DbError::TransactionError(
                "injected commit failure".to_string(),
            ));
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> DbResult<()> {
        self.rollbacks += 1;
        self.inner.rollback()
    }

    fn db_type(&self) -> &'static str {
        self.inner.db_type()
    }
}
