use pnotes_core::db::migrations::latest_version;
use pnotes_core::db::{open_db, open_db_in_memory, DbError};
use pnotes_core::model::note::Password;
use pnotes_core::{Argon2ChaCha, NoteService, SqliteNoteRepository};
use rusqlite::{params, Connection};

// Schema the previous notes app created in `~/.pnotes/notes.db`.
const PREVIOUS_APP_DDL: &str = "
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    encrypted INTEGER NOT NULL DEFAULT 0,
    tags TEXT,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notes_updated_at ON notes(updated_at DESC);
CREATE INDEX IF NOT EXISTS idx_notes_encrypted ON notes(encrypted);
";

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes");
    assert_table_exists(&conn, "tags");
    assert_table_exists(&conn, "note_tags");
    assert_table_exists(&conn, "settings");
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO settings (key, value) VALUES ('locale', 'en');",
        [],
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let value: String = conn
        .query_row("SELECT value FROM settings WHERE key = 'locale';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(value, "en");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn encrypted_column_rejects_values_other_than_zero_or_one() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO notes (id, title, content, encrypted, created_at, updated_at)
         VALUES (?1, 't', 'c', 2, 0, 0);",
        params!["00000000-0000-4000-8000-000000000000"],
    );
    assert!(result.is_err());
}

#[test]
fn deleting_note_cascades_tag_links() {
    let conn = open_db_in_memory().unwrap();
    let id = "00000000-0000-4000-8000-000000000001";
    conn.execute(
        "INSERT INTO notes (id, title, content, encrypted, created_at, updated_at)
         VALUES (?1, 't', 'c', 0, 0, 0);",
        params![id],
    )
    .unwrap();
    conn.execute("INSERT INTO tags (name) VALUES ('work');", [])
        .unwrap();
    conn.execute(
        "INSERT INTO note_tags (note_id, tag_id) SELECT ?1, id FROM tags WHERE name = 'work';",
        params![id],
    )
    .unwrap();

    conn.execute("DELETE FROM notes WHERE id = ?1;", params![id])
        .unwrap();
    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM note_tags;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
}

#[test]
fn previous_app_database_is_adopted_with_tags_and_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(PREVIOUS_APP_DDL).unwrap();
    let insert = "INSERT INTO notes (id, title, content, encrypted, tags, created_at, updated_at)
                  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);";
    conn.execute(
        insert,
        params![
            "6f1c2a3e-1b2c-4d5e-8f90-123456789abc",
            "Shopping",
            "milk",
            0,
            r#"["Home","errands"]"#,
            "2024-01-02T03:04:05Z",
            "2024-01-03T03:04:05Z"
        ],
    )
    .unwrap();
    // PBKDF2-SHA256 + AES-256-GCM envelopes, password "secret1".
    conn.execute(
        insert,
        params![
            "11111111-2222-4333-8444-555555555555",
            "AAECAwQFBgcICQoLDA0OD2RlZmdoaWprbG1ub2AeK8wL6Qwhywn3B+fwwBn+5yTf",
            "EBESExQVFhcYGRobHB0eH3BxcnN0dXZ3eHl6e3yk2ejn0s3uA/tmqLVOhJcLMPMrTTe0fg==",
            1,
            "null",
            "2024-01-01T00:00:00+03:00",
            "2024-01-01T00:00:00+03:00"
        ],
    )
    .unwrap();
    drop(conn);

    let mut conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let stash_left: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'legacy_notes';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stash_left, 0);

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo, Argon2ChaCha::default());
    let notes = service.list_notes().unwrap();
    assert_eq!(notes.len(), 2);

    let shopping = &notes[0];
    assert_eq!(shopping.id.to_string(), "6f1c2a3e-1b2c-4d5e-8f90-123456789abc");
    assert_eq!(shopping.tags, vec!["errands".to_string(), "home".to_string()]);
    assert_eq!(shopping.created_at, 1_704_164_645_000);
    assert_eq!(shopping.updated_at, 1_704_251_045_000);

    let locked = &notes[1];
    assert!(locked.is_encrypted());
    assert!(locked.tags.is_empty());
    let resolved = service
        .decrypt_note(locked.id, &Password::new("secret1"))
        .unwrap();
    assert_eq!(resolved.text.title, "Bank");
    assert_eq!(resolved.text.content, "pin 2580");
}

#[test]
fn adopted_database_is_not_adopted_twice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(PREVIOUS_APP_DDL).unwrap();
    conn.execute(
        "INSERT INTO notes (id, title, content, encrypted, tags, created_at, updated_at)
         VALUES ('not-a-uuid', 'Old', 'body', 0, '', 'garbage', 'garbage');",
        [],
    )
    .unwrap();
    drop(conn);

    drop(open_db(&path).unwrap());
    let conn = open_db(&path).unwrap();
    let (count, created_at): (i64, i64) = conn
        .query_row("SELECT COUNT(*), MAX(created_at) FROM notes;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(count, 1);
    assert!(created_at > 0);
    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'index' AND tbl_name = 'notes' AND name LIKE 'idx_notes_%';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexes, 2);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
