//! Schema migration engine for todo-app.
//!
//! Change units are collected into a [`Registry`], applied in ascending
//! ordinal order by the [`Engine`], and recorded in an append-only
//! [`AuditLedger`] table living in the same store they modify.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod unit;
pub mod units;

pub use engine::{
    Engine, Halt, HaltCause, NothingToDo, RunOutcome, RunReport, Status, Target, UnitStatus,
    VisitedUnit,
};
pub use error::{ForwardError, MigrateError, MigrateResult};
pub use ledger::{AuditLedger, AuditRecord};
pub use registry::{Registry, RegistryBuilder};
pub use unit::{ChangeUnit, Ordinal};
