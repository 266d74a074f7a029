//! Adoption of the `notes.db` schema written by the previous notes app.
//!
//! That schema never sets `user_version`, stores `created_at`/`updated_at` as
//! RFC 3339 text and keeps tags as a JSON array in `notes.tags`.
//!
//! # Invariants
//! - Only runs on `user_version = 0` databases whose `notes` table has a
//!   `tags` column.
//! - Runs inside the migration transaction; a failure leaves the file as it was.
//! - Encrypted rows are copied verbatim; their envelopes stay readable through
//!   `CryptoService::decrypt`.

use crate::db::DbResult;
use crate::model::note::normalize_tags;
use chrono::{DateTime, NaiveDateTime};
use log::warn;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const STASH_TABLE: &str = "legacy_notes";

struct LegacyRow {
    id: Option<String>,
    title: String,
    content: String,
    encrypted: bool,
    tags: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// Returns whether `conn` holds the previous app's `notes` table.
pub(super) fn detect(conn: &Connection) -> DbResult<bool> {
    let has_tags_column: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pragma_table_info('notes') WHERE name = 'tags');",
        [],
        |row| row.get(0),
    )?;
    Ok(has_tags_column)
}

/// Moves the old table aside so the current schema can be created.
///
/// The old indexes share names with the current ones and are dropped first.
pub(super) fn stash(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(&format!(
        "DROP INDEX IF EXISTS idx_notes_updated_at;
         DROP INDEX IF EXISTS idx_notes_encrypted;
         ALTER TABLE notes RENAME TO {STASH_TABLE};"
    ))?;
    Ok(())
}

/// Copies stashed rows into the current schema and drops the stash.
///
/// Returns the number of notes copied.
pub(super) fn copy_rows(conn: &Connection) -> DbResult<usize> {
    let rows = {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, title, content, encrypted, tags, created_at, updated_at FROM {STASH_TABLE};"
        ))?;
        let mapped = stmt.query_map([], read_legacy_row)?;
        mapped.collect::<rusqlite::Result<Vec<_>>>()?
    };

    let now = chrono::Utc::now().timestamp_millis();
    for row in &rows {
        let id = row
            .id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .unwrap_or_else(|| {
                warn!("event=db_migrate module=db status=legacy_id_replaced");
                Uuid::new_v4()
            })
            .to_string();
        let created_at = row
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(now);
        let updated_at = row
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(created_at);

        conn.execute(
            "INSERT INTO notes (id, title, content, encrypted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id,
                row.title,
                row.content,
                i64::from(row.encrypted),
                created_at,
                updated_at
            ],
        )?;

        for tag in parse_tags(row.tags.as_deref()) {
            conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [tag.as_str()])?;
            conn.execute(
                "INSERT OR IGNORE INTO note_tags (note_id, tag_id)
                 SELECT ?1, id
                 FROM tags
                 WHERE name = ?2 COLLATE NOCASE;",
                params![id, tag.as_str()],
            )?;
        }
    }

    conn.execute_batch(&format!("DROP TABLE {STASH_TABLE};"))?;
    Ok(rows.len())
}

fn read_legacy_row(row: &Row<'_>) -> rusqlite::Result<LegacyRow> {
    let encrypted = match row.get_ref(3)? {
        ValueRef::Integer(value) => value != 0,
        ValueRef::Text(raw) => matches!(raw, b"1" | b"true"),
        _ => false,
    };
    Ok(LegacyRow {
        id: text(row, 0)?,
        title: text(row, 1)?.unwrap_or_default(),
        content: text(row, 2)?.unwrap_or_default(),
        encrypted,
        tags: text(row, 4)?,
        created_at: text(row, 5)?,
        updated_at: text(row, 6)?,
    })
}

fn text(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(index)? {
        ValueRef::Text(raw) => Some(String::from_utf8_lossy(raw).into_owned()),
        _ => None,
    })
}

fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Option<Vec<String>>>(raw) {
        Ok(tags) => normalize_tags(&tags.unwrap_or_default()),
        Err(err) => {
            warn!("event=db_migrate module=db status=legacy_tags_dropped error={err}");
            Vec::new()
        }
    }
}

/// RFC 3339 first, then SQLite's `YYYY-MM-DD HH:MM:SS` read as UTC.
fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.timestamp_millis())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|parsed| parsed.and_utc().timestamp_millis())
        })
        .ok()
}
