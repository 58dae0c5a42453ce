use dailydose_core::db::schema::{schema_version, upgrade_schema, SchemaUpgrade, SCHEMA_VERSION};
use dailydose_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection};

fn seed_dose(conn: &Connection, dose_id: &str) {
    conn.execute(
        "INSERT OR IGNORE INTO tags (name, demand) VALUES ('health', 1.0);",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO doses (id, tag_name, frequency_type, frequency_count, frequency_period, message)
         VALUES (?1, 'health', 'at-least', 3, 'week', 'stretch');",
        [dose_id],
    )
    .unwrap();
}

fn history_rows(conn: &Connection, dose_id: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM history WHERE dose_id = ?1;",
        [dose_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn fresh_connection_is_upgraded_once() {
    let mut conn = Connection::open_in_memory().unwrap();

    let first = upgrade_schema(&mut conn).unwrap();
    assert_eq!(
        first,
        SchemaUpgrade {
            from_version: 0,
            to_version: SCHEMA_VERSION
        }
    );
    assert!(!first.is_noop());

    let second = upgrade_schema(&mut conn).unwrap();
    assert!(second.is_noop());
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
}

#[test]
fn reopening_file_database_keeps_doses_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("daily_dose.db");

    let conn = open_db(&path).unwrap();
    seed_dose(&conn, "stretch");
    conn.execute(
        "INSERT INTO history (dose_id, count_in_current_period, last_sent_at)
         VALUES ('stretch', 2, '2023-10-25T08:00:00');",
        [],
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    let count: u32 = conn
        .query_row(
            "SELECT count_in_current_period FROM history WHERE dose_id = 'stretch';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn database_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, SCHEMA_VERSION + 1);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unwritable_parent_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"plain file").unwrap();

    match open_db(blocker.join("daily_dose.db")).unwrap_err() {
        DbError::CreateDir { path, .. } => assert_eq!(path, blocker),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn dose_with_unknown_tag_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO doses (id, tag_name, frequency_type, frequency_count, frequency_period, message)
         VALUES ('orphan', 'missing', 'at-least', 1, 'day', 'msg');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn tag_demand_must_be_positive() {
    let conn = open_db_in_memory().unwrap();
    for demand in [0.0, -1.5] {
        let result = conn.execute(
            "INSERT INTO tags (name, demand) VALUES ('idle', ?1);",
            params![demand],
        );
        assert!(result.is_err(), "demand {demand} was accepted");
    }
    assert!(conn
        .execute("INSERT INTO tags (name, demand) VALUES ('  ', 1.0);", [])
        .is_err());
}

#[test]
fn history_count_cannot_go_negative() {
    let conn = open_db_in_memory().unwrap();
    seed_dose(&conn, "stretch");

    let result = conn.execute(
        "INSERT INTO history (dose_id, count_in_current_period) VALUES ('stretch', -1);",
        [],
    );
    assert!(result.is_err());
    assert_eq!(history_rows(&conn, "stretch"), 0);

    conn.execute("INSERT INTO history (dose_id) VALUES ('stretch');", [])
        .unwrap();
    let (count, last_sent_at): (u32, Option<String>) = conn
        .query_row(
            "SELECT count_in_current_period, last_sent_at FROM history WHERE dose_id = 'stretch';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(last_sent_at, None);
}

#[test]
fn deleting_dose_removes_its_history() {
    let conn = open_db_in_memory().unwrap();
    seed_dose(&conn, "stretch");
    seed_dose(&conn, "walk");
    conn.execute_batch(
        "INSERT INTO history (dose_id, count_in_current_period) VALUES ('stretch', 1);
         INSERT INTO history (dose_id, count_in_current_period) VALUES ('walk', 1);",
    )
    .unwrap();

    conn.execute("DELETE FROM doses WHERE id = 'stretch';", [])
        .unwrap();

    assert_eq!(history_rows(&conn, "stretch"), 0);
    assert_eq!(history_rows(&conn, "walk"), 1);
}
