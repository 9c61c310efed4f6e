use super::*;
use std::path::Path;
use tempfile::tempdir;
use todo_db::{DuckDbStore, Store};
use todo_migrate::AuditLedger;

fn global(dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir.to_path_buf(),
        config: None,
        database: Some("todo.duckdb".to_string()),
    }
}

fn recorded(dir: &Path) -> Vec<u32> {
    let store = DuckDbStore::from_path(&dir.join("todo.duckdb")).unwrap();
    let ledger = AuditLedger::default();
    ledger.ensure_table(store.connection()).unwrap();
    ledger
        .applied(store.connection())
        .unwrap()
        .iter()
        .map(|r| r.ordinal.get())
        .collect()
}

#[tokio::test]
async fn test_migrate_applies_all_builtin_units() {
    let dir = tempdir().unwrap();
    let args = MigrateArgs {
        number: None,
        dry_run: false,
    };

    execute(&args, &global(dir.path())).await.unwrap();

    assert_eq!(recorded(dir.path()), vec![1, 2]);
    let store = DuckDbStore::from_path(&dir.path().join("todo.duckdb")).unwrap();
    assert!(store.relation_exists("users").unwrap());
    assert!(store.relation_exists("todos").unwrap());
}

#[tokio::test]
async fn test_migrate_to_number_then_latest() {
    let dir = tempdir().unwrap();

    let to_first = MigrateArgs {
        number: Some(1),
        dry_run: false,
    };
    execute(&to_first, &global(dir.path())).await.unwrap();
    assert_eq!(recorded(dir.path()), vec![1]);

    let to_latest = MigrateArgs {
        number: None,
        dry_run: false,
    };
    execute(&to_latest, &global(dir.path())).await.unwrap();
    assert_eq!(recorded(dir.path()), vec![1, 2]);

    // Second run is a no-op and still succeeds
    execute(&to_latest, &global(dir.path())).await.unwrap();
    assert_eq!(recorded(dir.path()), vec![1, 2]);
}

#[tokio::test]
async fn test_migrate_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let args = MigrateArgs {
        number: None,
        dry_run: true,
    };

    execute(&args, &global(dir.path())).await.unwrap();

    assert!(recorded(dir.path()).is_empty());
    let store = DuckDbStore::from_path(&dir.path().join("todo.duckdb")).unwrap();
    assert!(!store.relation_exists("users").unwrap());
}

#[tokio::test]
async fn test_migrate_fails_when_a_unit_halts() {
    let dir = tempdir().unwrap();
    {
        // A stray todos table makes the second unit fail
        let store = DuckDbStore::from_path(&dir.path().join("todo.duckdb")).unwrap();
        store
            .connection()
            .execute_batch("CREATE TABLE todos (id INTEGER)")
            .unwrap();
    }
    let args = MigrateArgs {
        number: None,
        dry_run: false,
    };

    let err = execute(&args, &global(dir.path())).await.unwrap_err();

    assert!(err.to_string().contains("create_todos"), "{err}");
    assert_eq!(recorded(dir.path()), vec![1]);
}

#[tokio::test]
async fn test_migrate_uses_configured_ledger_table() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("todo.yml"),
        "migrations:\n  table: schema_history\n",
    )
    .unwrap();
    let args = MigrateArgs {
        number: None,
        dry_run: false,
    };

    execute(&args, &global(dir.path())).await.unwrap();

    let store = DuckDbStore::from_path(&dir.path().join("todo.duckdb")).unwrap();
    assert!(store.relation_exists("schema_history").unwrap());
    assert!(!store.relation_exists("migrations").unwrap());
}
