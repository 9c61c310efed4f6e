//! todo-db - Store handle for todo-app
//!
//! This crate provides the [`Store`] trait, the [`Transaction`] guard built on
//! top of it, and the DuckDB implementation used by the application.

pub mod duckdb;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use crate::duckdb::DuckDbStore;
pub use error::{DbError, DbResult};
pub use traits::{Store, Transaction};
