// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = setup_test_db();

    let result = canopy_store::migrations::apply_migrations(&mut conn);
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );

    let tables = get_table_names(&conn);
    for expected in ["pages", "schema_version", "slot_policies", "versions"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migration_idempotency() {
    let mut conn = setup_test_db();
    canopy_store::migrations::apply_migrations(&mut conn).unwrap();
    canopy_store::migrations::apply_migrations(&mut conn).unwrap();

    let version_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version_count, 1, "Re-applying must not record twice");
}

#[test]
fn test_schema_rejects_second_published_version() {
    let mut conn = setup_test_db();
    canopy_store::migrations::apply_migrations(&mut conn).unwrap();

    conn.execute(
        "INSERT INTO pages (id, title, parent_id, layout_id, created_at)
         VALUES ('home', 'Home', NULL, 'default', '2024-06-01T00:00:00Z')",
        [],
    )
    .unwrap();
    let insert = |id: &str, seq: i64| {
        conn.execute(
            "INSERT INTO versions (id, page_id, sequence, status, created_at, slots_json, content_digest)
             VALUES (?1, 'home', ?2, 'published', '2024-06-01T00:00:00Z', '{}', 'x')",
            rusqlite::params![id, seq],
        )
    };

    insert("v1", 1).unwrap();
    assert!(insert("v2", 2).is_err(), "Partial unique index should reject");
}

#[test]
fn test_schema_rejects_duplicate_sequence() {
    let mut conn = setup_test_db();
    canopy_store::migrations::apply_migrations(&mut conn).unwrap();

    conn.execute(
        "INSERT INTO pages (id, title, parent_id, layout_id, created_at)
         VALUES ('home', 'Home', NULL, 'default', '2024-06-01T00:00:00Z')",
        [],
    )
    .unwrap();
    let insert = |id: &str| {
        conn.execute(
            "INSERT INTO versions (id, page_id, sequence, status, created_at, slots_json, content_digest)
             VALUES (?1, 'home', 1, 'draft', '2024-06-01T00:00:00Z', '{}', 'x')",
            [id],
        )
    };

    insert("v1").unwrap();
    assert!(insert("v2").is_err());
}
