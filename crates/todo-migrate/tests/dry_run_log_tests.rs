//! Checks the per-unit log lines emitted by a dry run.
//!
//! Kept in its own test binary because it installs a global logger.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;
use todo_db::DuckDbStore;
use todo_migrate::{ChangeUnit, Engine, Ordinal, Registry, Target};

struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.lines.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};

fn unit(n: u32, name: &str) -> ChangeUnit {
    ChangeUnit::sql(Ordinal::new(n).unwrap(), name, "SELECT 1")
}

#[test]
fn dry_run_logs_would_apply_for_units_up_to_target() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Info);

    let engine = Engine::new(
        Registry::builder()
            .register(unit(3, "add_due_date"))
            .register(unit(1, "create_users"))
            .register(unit(2, "create_todos"))
            .build()
            .unwrap(),
    );
    let mut store = DuckDbStore::in_memory().unwrap();

    engine
        .run(&mut store, Target::Ordinal(Ordinal::new(2).unwrap()), true)
        .unwrap();

    let lines = LOGGER.lines.lock().unwrap();
    let would_apply: Vec<&String> = lines
        .iter()
        .filter(|l| l.contains("would apply"))
        .collect();

    assert_eq!(would_apply.len(), 2, "{lines:?}");
    assert!(would_apply[0].contains("migration=001") && would_apply[0].contains("create_users"));
    assert!(would_apply[1].contains("migration=002") && would_apply[1].contains("create_todos"));
    assert!(lines.iter().all(|l| !l.contains("add_due_date")));
    assert!(lines.iter().any(|l| l.contains("DRY RUN")));
}
