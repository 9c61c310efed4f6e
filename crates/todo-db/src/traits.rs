//! Store handle trait definition

use crate::error::DbResult;
use duckdb::Connection;

/// Transactional store handle consumed by the migration engine.
///
/// Implementations expose the raw transaction primitives; callers normally go
/// through [`Store::begin_transaction`], which returns a [`Transaction`] guard
/// that rolls back unless it is explicitly committed.
pub trait Store {
    /// Connection used for queries, both inside and outside a transaction
    fn connection(&self) -> &Connection;

    /// Start a transaction
    fn begin(&mut self) -> DbResult<()>;

    /// Commit the active transaction
    fn commit(&mut self) -> DbResult<()>;

    /// Roll back the active transaction
    fn rollback(&mut self) -> DbResult<()>;

    /// Store type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Begin a unit of work.
    fn begin_transaction(&mut self) -> DbResult<Transaction<'_, Self>>
    where
        Self: Sized,
    {
        self.begin()?;
        Ok(Transaction {
            store: self,
            finished: false,
        })
    }
}

/// An open transaction on a [`Store`].
///
/// Dropping the guard without calling [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) rolls the transaction back.
pub struct Transaction<'s, S: Store> {
    store: &'s mut S,
    finished: bool,
}

impl<S: Store> Transaction<'_, S> {
    /// Connection bound to this transaction
    pub fn handle(&self) -> &Connection {
        self.store.connection()
    }

    /// Commit the transaction.
    pub fn commit(mut self) -> DbResult<()> {
        self.finished = true;
        self.store.commit()
    }

    /// Roll back the transaction.
    pub fn rollback(mut self) -> DbResult<()> {
        self.finished = true;
        self.store.rollback()
    }
}

impl<S: Store> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.store.rollback() {
                log::warn!("Rollback of abandoned transaction failed: {e}");
            }
        }
    }
}
