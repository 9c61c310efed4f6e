//! Migration engine: ordered, fail-fast, audited application of change units.
//!
//! A run is a linear walk over the registry in ascending ordinal order. Each
//! unit is applied inside its own transaction and recorded in the audit
//! ledger before the next one is visited. The first failure halts the run;
//! re-invoking the engine resumes just past the highest recorded ordinal.
//!
//! The engine assumes it is the only writer of the ledger. Two concurrent runs
//! against the same store race on `highest_applied` and may apply a unit twice.

use crate::error::{ForwardError, MigrateError, MigrateResult};
use crate::ledger::{AuditLedger, AuditRecord};
use crate::registry::Registry;
use crate::unit::{ChangeUnit, Ordinal};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use todo_core::{AuditMode, MigrationsConfig};
use todo_db::{DbError, Store};

/// How far a run should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Every registered unit
    #[default]
    Latest,
    /// Units up to and including this ordinal
    Ordinal(Ordinal),
}

/// Why a run finished without visiting any unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NothingToDo {
    /// The registry is empty
    NoUnits,
    /// The ledger is at or beyond the newest registered unit
    UpToDate,
    /// The requested target is not ahead of the ledger; backwards migrations
    /// are not supported
    TargetNotAhead,
}

impl std::fmt::Display for NothingToDo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NothingToDo::NoUnits => write!(f, "no migrations to apply"),
            NothingToDo::UpToDate => write!(f, "no migrations to apply, database is up to date"),
            NothingToDo::TargetNotAhead => write!(
                f,
                "no migrations to apply, target is not ahead of the latest applied migration; backwards migrations are not supported"
            ),
        }
    }
}

/// What stopped a run partway through.
#[derive(Error, Debug)]
pub enum HaltCause {
    /// The unit's transaction could not be opened
    #[error("unable to begin transaction: {0}")]
    Begin(#[source] DbError),

    /// The forward action failed; its transaction was rolled back
    #[error("unable to apply migration: {0}")]
    Forward(#[source] ForwardError),

    /// The commit failed; the unit's effect is not durable
    #[error("unable to commit transaction: {0}")]
    Commit(#[source] DbError),

    /// The ledger write failed inside the unit's transaction, which was rolled
    /// back with it
    #[error("unable to record migration: {0}")]
    AuditWrite(#[source] MigrateError),

    /// The unit committed but its ledger write failed. The schema is now ahead
    /// of the ledger and must be reconciled by hand.
    #[error("migration committed but could not be recorded; schema is ahead of the ledger: {0}")]
    Unrecorded(#[source] MigrateError),
}

/// The unit a run halted on, and why.
#[derive(Debug)]
pub struct Halt {
    pub ordinal: Ordinal,
    pub name: String,
    pub cause: HaltCause,
}

impl std::fmt::Display for Halt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "migration {} ({}) halted the run: {}",
            self.ordinal, self.name, self.cause
        )
    }
}

/// Final state of a run.
#[derive(Debug)]
pub enum RunOutcome {
    NothingToDo(NothingToDo),
    /// Every unit up to the target was visited
    Complete,
    Halted(Halt),
}

/// A unit visited by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitedUnit {
    pub ordinal: Ordinal,
    pub name: String,
}

/// Result of [`Engine::run`].
#[derive(Debug)]
pub struct RunReport {
    pub dry_run: bool,
    /// Highest ledger ordinal observed before the run
    pub highest_applied: Option<Ordinal>,
    /// Resolved target; `None` when the registry is empty
    pub target: Option<Ordinal>,
    /// Units applied, in order. In a dry run, the units that would be applied.
    pub visited: Vec<VisitedUnit>,
    pub outcome: RunOutcome,
}

impl RunReport {
    /// The halt, if the run stopped on a failure
    pub fn halt(&self) -> Option<&Halt> {
        match &self.outcome {
            RunOutcome::Halted(halt) => Some(halt),
            _ => None,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halt().is_some()
    }

    /// Whether the run stopped before visiting anything
    pub fn is_noop(&self) -> bool {
        matches!(self.outcome, RunOutcome::NothingToDo(_))
    }

    /// One-line summary for operators.
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "would apply" } else { "applied" };
        match &self.outcome {
            RunOutcome::NothingToDo(reason) => reason.to_string(),
            RunOutcome::Complete => format!(
                "{} {} migration{}",
                verb,
                self.visited.len(),
                if self.visited.len() == 1 { "" } else { "s" }
            ),
            RunOutcome::Halted(halt) => format!("{} {} before halt: {}", verb, self.visited.len(), halt),
        }
    }
}

/// Applied state of one registered unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitStatus {
    pub ordinal: Ordinal,
    pub name: String,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Registry compared against the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub ledger_table: String,
    pub highest_applied: Option<Ordinal>,
    pub units: Vec<UnitStatus>,
    /// Registered units below the highest applied ordinal that have no ledger
    /// record. A run never applies these.
    pub gaps: Vec<Ordinal>,
    /// Ledger records whose ordinal is not registered
    pub unknown: Vec<AuditRecord>,
}

impl Status {
    /// Registered units above the highest applied ordinal
    pub fn pending(&self) -> impl Iterator<Item = &UnitStatus> + '_ {
        self.units
            .iter()
            .filter(move |u| self.highest_applied.map_or(true, |h| u.ordinal > h))
    }
}

/// Applies a [`Registry`] to a [`Store`], recording progress in an
/// [`AuditLedger`].
#[derive(Debug)]
pub struct Engine {
    registry: Registry,
    ledger: AuditLedger,
    audit: AuditMode,
}

impl Engine {
    /// Engine over `registry` with the default ledger table and audit mode.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            ledger: AuditLedger::default(),
            audit: AuditMode::default(),
        }
    }

    /// Engine configured from the `migrations` section of `todo.yml`.
    pub fn from_config(registry: Registry, config: &MigrationsConfig) -> Self {
        Self::new(registry)
            .with_ledger(AuditLedger::new(config.table.clone()))
            .with_audit_mode(config.audit)
    }

    pub fn with_ledger(mut self, ledger: AuditLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_audit_mode(mut self, audit: AuditMode) -> Self {
        self.audit = audit;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn ledger(&self) -> &AuditLedger {
        &self.ledger
    }

    pub fn audit_mode(&self) -> AuditMode {
        self.audit
    }

    /// Apply every pending unit up to `target`.
    ///
    /// Returns `Err` only when the ledger cannot be prepared or read. A failure
    /// while applying a unit halts the run and is reported through
    /// [`RunReport::outcome`]. With `dry_run` set, units are logged and listed
    /// but the store is never written beyond creating the ledger table.
    pub fn run<S: Store>(
        &self,
        store: &mut S,
        target: Target,
        dry_run: bool,
    ) -> MigrateResult<RunReport> {
        if dry_run {
            log::info!("=== DRY RUN ===");
        }

        log::debug!(
            "Ensuring ledger table '{}' is present in {} store",
            self.ledger.table(),
            store.db_type()
        );
        self.ledger.ensure_table(store.connection())?;
        let highest = self.ledger.highest_applied(store.connection())?;

        let mut report = RunReport {
            dry_run,
            highest_applied: highest,
            target: None,
            visited: Vec::new(),
            outcome: RunOutcome::Complete,
        };

        if let Some(h) = highest {
            self.warn_inconsistencies(store, h)?;
        }

        let Some(latest) = self.registry.latest() else {
            return Ok(nothing_to_do(report, NothingToDo::NoUnits));
        };

        if highest.is_some_and(|h| h >= latest) {
            return Ok(nothing_to_do(report, NothingToDo::UpToDate));
        }

        let target = match target {
            Target::Latest => latest,
            Target::Ordinal(ordinal) => ordinal,
        };
        report.target = Some(target);

        if highest.is_some_and(|h| target <= h) {
            return Ok(nothing_to_do(report, NothingToDo::TargetNotAhead));
        }

        for unit in self.registry.all() {
            if unit.ordinal() > target {
                break;
            }
            if highest.is_some_and(|h| unit.ordinal() <= h) {
                continue;
            }

            if dry_run {
                log::info!(
                    "migration={} name={} would apply migration",
                    unit.ordinal(),
                    unit.name()
                );
                report.visited.push(visited(unit));
                continue;
            }

            log::info!(
                "migration={} name={} applying migration",
                unit.ordinal(),
                unit.name()
            );
            if let Err(halt) = self.apply(store, unit) {
                report.outcome = RunOutcome::Halted(halt);
                return Ok(report);
            }
            report.visited.push(visited(unit));
        }

        Ok(report)
    }

    /// Apply one unit in its own transaction and record it.
    fn apply<S: Store>(&self, store: &mut S, unit: &ChangeUnit) -> Result<(), Halt> {
        let halt = |cause| Halt {
            ordinal: unit.ordinal(),
            name: unit.name().to_string(),
            cause,
        };

        let tx = store.begin_transaction().map_err(|e| {
            log::error!(
                "migration={} name={} unable to begin transaction: {e}",
                unit.ordinal(),
                unit.name()
            );
            halt(HaltCause::Begin(e))
        })?;

        if let Err(e) = unit.apply(tx.handle()) {
            log::error!(
                "migration={} name={} unable to apply migration, rolling back: {e}",
                unit.ordinal(),
                unit.name()
            );
            if let Err(rb) = tx.rollback() {
                log::error!(
                    "migration={} name={} unable to roll back: {rb}",
                    unit.ordinal(),
                    unit.name()
                );
            }
            return Err(halt(HaltCause::Forward(e)));
        }

        match self.audit {
            AuditMode::SameTransaction => {
                let recorded =
                    self.ledger
                        .record(tx.handle(), unit.ordinal(), unit.name(), Utc::now());
                if let Err(e) = recorded {
                    log::error!(
                        "migration={} name={} unable to record migration, rolling back: {e}",
                        unit.ordinal(),
                        unit.name()
                    );
                    if let Err(rb) = tx.rollback() {
                        log::error!(
                            "migration={} name={} unable to roll back: {rb}",
                            unit.ordinal(),
                            unit.name()
                        );
                    }
                    return Err(halt(HaltCause::AuditWrite(e)));
                }
                tx.commit().map_err(|e| {
                    log::error!(
                        "migration={} name={} unable to commit transaction: {e}",
                        unit.ordinal(),
                        unit.name()
                    );
                    halt(HaltCause::Commit(e))
                })?;
            }
            AuditMode::AfterCommit => {
                tx.commit().map_err(|e| {
                    log::error!(
                        "migration={} name={} unable to commit transaction: {e}",
                        unit.ordinal(),
                        unit.name()
                    );
                    halt(HaltCause::Commit(e))
                })?;

                if let Err(e) = self.record_separately(store, unit) {
                    log::error!(
                        "migration={} name={} committed but unable to create migration record; \
                         schema is ahead of the ledger, run `todo mark-applied {}` once verified: {e}",
                        unit.ordinal(),
                        unit.name(),
                        unit.ordinal().get()
                    );
                    return Err(halt(HaltCause::Unrecorded(e)));
                }
            }
        }

        log::debug!(
            "migration={} name={} applied and recorded",
            unit.ordinal(),
            unit.name()
        );
        Ok(())
    }

    fn record_separately<S: Store>(&self, store: &mut S, unit: &ChangeUnit) -> MigrateResult<()> {
        let tx = store.begin_transaction()?;
        self.ledger
            .record(tx.handle(), unit.ordinal(), unit.name(), Utc::now())?;
        tx.commit()?;
        Ok(())
    }

    /// Compare the registry with the ledger without applying anything.
    pub fn status<S: Store>(&self, store: &S) -> MigrateResult<Status> {
        self.ledger.ensure_table(store.connection())?;
        let records = self.ledger.applied(store.connection())?;
        let highest = records.last().map(|r| r.ordinal);

        let units = self
            .registry
            .all()
            .iter()
            .map(|unit| UnitStatus {
                ordinal: unit.ordinal(),
                name: unit.name().to_string(),
                applied_at: records
                    .iter()
                    .find(|r| r.ordinal == unit.ordinal())
                    .map(|r| r.applied_at),
            })
            .collect::<Vec<_>>();

        let gaps = units
            .iter()
            .filter(|u| u.applied_at.is_none() && highest.is_some_and(|h| u.ordinal < h))
            .map(|u| u.ordinal)
            .collect();

        let unknown = records
            .into_iter()
            .filter(|r| self.registry.get(r.ordinal).is_none())
            .collect();

        Ok(Status {
            ledger_table: self.ledger.table().to_string(),
            highest_applied: highest,
            units,
            gaps,
            unknown,
        })
    }

    /// Record a registered unit as applied without running it.
    ///
    /// Used to reconcile the ledger after a unit committed but its record was
    /// lost (see [`HaltCause::Unrecorded`]). The caller is responsible for
    /// checking that the unit's effect is really present.
    pub fn mark_applied<S: Store>(
        &self,
        store: &mut S,
        ordinal: Ordinal,
    ) -> MigrateResult<AuditRecord> {
        let unit = self
            .registry
            .get(ordinal)
            .ok_or(MigrateError::UnknownUnit(ordinal))?;

        self.ledger.ensure_table(store.connection())?;
        let applied: BTreeSet<Ordinal> = self
            .ledger
            .applied(store.connection())?
            .into_iter()
            .map(|r| r.ordinal)
            .collect();
        if applied.contains(&ordinal) {
            return Err(MigrateError::AlreadyApplied {
                ordinal,
                name: unit.name().to_string(),
            });
        }

        let tx = store.begin_transaction()?;
        let record = self
            .ledger
            .record(tx.handle(), ordinal, unit.name(), Utc::now())?;
        tx.commit()?;

        log::warn!(
            "migration={} name={} marked as applied without running it",
            ordinal,
            unit.name()
        );
        Ok(record)
    }

    fn warn_inconsistencies<S: Store>(&self, store: &S, highest: Ordinal) -> MigrateResult<()> {
        let recorded: BTreeSet<Ordinal> = self
            .ledger
            .applied(store.connection())?
            .into_iter()
            .map(|r| r.ordinal)
            .collect();

        for unit in self.registry.all() {
            if unit.ordinal() >= highest {
                break;
            }
            if !recorded.contains(&unit.ordinal()) {
                log::warn!(
                    "migration={} name={} is below the latest applied migration {} but has no ledger record; it will not be applied",
                    unit.ordinal(),
                    unit.name(),
                    highest
                );
            }
        }

        for ordinal in recorded {
            if self.registry.get(ordinal).is_none() {
                log::warn!("migration={ordinal} is recorded in the ledger but not registered");
            }
        }
        Ok(())
    }
}

fn nothing_to_do(mut report: RunReport, reason: NothingToDo) -> RunReport {
    log::info!("{reason}");
    report.outcome = RunOutcome::NothingToDo(reason);
    report
}

fn visited(unit: &ChangeUnit) -> VisitedUnit {
    VisitedUnit {
        ordinal: unit.ordinal(),
        name: unit.name().to_string(),
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
