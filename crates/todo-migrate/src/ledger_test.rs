use super::*;
use chrono::TimeZone;

fn ord(n: u32) -> Ordinal {
    Ordinal::new(n).unwrap()
}

fn conn() -> Connection {
    Connection::open_in_memory().unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

#[test]
fn ensure_table_is_idempotent() {
    let conn = conn();
    let ledger = AuditLedger::default();
    ledger.ensure_table(&conn).unwrap();
    ledger.record(&conn, ord(1), "create_users", at(1_700_000_000)).unwrap();
    ledger.ensure_table(&conn).unwrap();

    assert_eq!(ledger.applied(&conn).unwrap().len(), 1);
}

#[test]
fn highest_applied_is_none_on_empty_ledger() {
    let conn = conn();
    let ledger = AuditLedger::default();
    ledger.ensure_table(&conn).unwrap();
    assert_eq!(ledger.highest_applied(&conn).unwrap(), None);
}

#[test]
fn highest_applied_returns_max_not_last_inserted() {
    let conn = conn();
    let ledger = AuditLedger::default();
    ledger.ensure_table(&conn).unwrap();
    ledger.record(&conn, ord(3), "c", at(1)).unwrap();
    ledger.record(&conn, ord(1), "a", at(2)).unwrap();

    assert_eq!(ledger.highest_applied(&conn).unwrap(), Some(ord(3)));
}

#[test]
fn highest_applied_without_table_is_read_error() {
    let conn = conn();
    let err = AuditLedger::default().highest_applied(&conn).unwrap_err();
    assert!(matches!(err, MigrateError::LedgerRead { .. }));
}

#[test]
fn record_round_trips_timestamp() {
    let conn = conn();
    let ledger = AuditLedger::default();
    ledger.ensure_table(&conn).unwrap();
    let when = Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap();

    let written = ledger.record(&conn, ord(2), "create_todos", when).unwrap();
    let records = ledger.applied(&conn).unwrap();

    assert_eq!(records, vec![written]);
    assert_eq!(records[0].applied_at, when);
    assert_eq!(records[0].name, "create_todos");
}

#[test]
fn record_twice_for_same_ordinal_fails() {
    let conn = conn();
    let ledger = AuditLedger::default();
    ledger.ensure_table(&conn).unwrap();
    ledger.record(&conn, ord(1), "a", at(1)).unwrap();

    let err = ledger.record(&conn, ord(1), "a", at(2)).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::LedgerWrite { ordinal, .. } if ordinal == ord(1)
    ));
}

#[test]
fn applied_is_sorted_by_ordinal() {
    let conn = conn();
    let ledger = AuditLedger::default();
    ledger.ensure_table(&conn).unwrap();
    for n in [5, 2, 9] {
        ledger.record(&conn, ord(n), "unit", at(i64::from(n))).unwrap();
    }

    let ordinals: Vec<u32> = ledger
        .applied(&conn)
        .unwrap()
        .iter()
        .map(|r| r.ordinal.get())
        .collect();
    assert_eq!(ordinals, vec![2, 5, 9]);
}

#[test]
fn custom_table_name_is_used() {
    let conn = conn();
    let ledger = AuditLedger::new("schema_ledger");
    ledger.ensure_table(&conn).unwrap();
    ledger.record(&conn, ord(1), "a", at(1)).unwrap();

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_ledger", [], |row| row.get(0))
        .unwrap();
    assert_eq!(n, 1);
    assert_eq!(ledger.table(), "schema_ledger");
}

#[test]
fn invalid_stored_ordinal_is_reported() {
    let conn = conn();
    let ledger = AuditLedger::default();
    ledger.ensure_table(&conn).unwrap();
    conn.execute_batch("INSERT INTO migrations VALUES (0, 'bogus', now()::TIMESTAMP)")
        .unwrap();

    let err = ledger.highest_applied(&conn).unwrap_err();
    assert!(matches!(err, MigrateError::CorruptLedger { value: 0, .. }));
}
