//! todo-core - Core library for todo-app
//!
//! This crate provides configuration parsing and the error type shared by the
//! store, migration and CLI crates.

pub mod config;
pub mod error;

pub use config::{AuditMode, Config, DatabaseConfig, MigrationsConfig};
pub use error::{CoreError, CoreResult};
