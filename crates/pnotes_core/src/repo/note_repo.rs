//! Note/tag repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist note rows (plaintext or ciphertext, as given) with their tags.
//! - Own tag-link replacement with atomic semantics on every write.
//!
//! # Invariants
//! - Note row and tag links are written in a single transaction.
//! - List order is `updated_at DESC, id ASC`.
//! - Tags are read back lowercase and alphabetical.

use crate::model::note::NoteId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    encrypted,
    created_at,
    updated_at
FROM notes";

/// Persistence shape of one note row.
///
/// When `encrypted` is true, `title` and `content` hold ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNote {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub encrypted: bool,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts one note row and its tag links.
    fn create_note(&mut self, note: &StoredNote) -> RepoResult<NoteId>;
    /// Replaces title, content, protection flag, tags and `updated_at`.
    fn update_note(&mut self, note: &StoredNote) -> RepoResult<()>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<StoredNote>>;
    /// Lists every note, most recently updated first.
    fn list_notes(&self) -> RepoResult<Vec<StoredNote>>;
    /// Deletes one note; tag links cascade.
    fn delete_note(&mut self, id: NoteId) -> RepoResult<()>;
    /// Returns the number of stored notes.
    fn count_notes(&self) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails fast when the schema is missing, instead of on first query.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&mut self, note: &StoredNote) -> RepoResult<NoteId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (id, title, content, encrypted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                bool_to_int(note.encrypted),
                note.created_at,
                note.updated_at,
            ],
        )?;
        replace_tags_in_tx(&tx, &note.id.to_string(), &note.tags)?;
        tx.commit()?;
        Ok(note.id)
    }

    fn update_note(&mut self, note: &StoredNote) -> RepoResult<()> {
        let id_text = note.id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                encrypted = ?4,
                updated_at = ?5
             WHERE id = ?1;",
            params![
                id_text.as_str(),
                note.title.as_str(),
                note.content.as_str(),
                bool_to_int(note.encrypted),
                note.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }

        replace_tags_in_tx(&tx, &id_text, &note.tags)?;
        tx.commit()?;
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<StoredNote>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], read_note_columns)
            .optional()?;

        match row {
            Some(columns) => Ok(Some(columns.into_stored(self.conn)?)),
            None => Ok(None),
        }
    }

    fn list_notes(&self) -> RepoResult<Vec<StoredNote>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY updated_at DESC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(read_note_columns(row)?.into_stored(self.conn)?);
        }
        Ok(notes)
    }

    fn delete_note(&mut self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count_notes(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }
}

/// Raw column values before id/flag validation and tag loading.
struct NoteColumns {
    id: String,
    title: String,
    content: String,
    encrypted: i64,
    created_at: i64,
    updated_at: i64,
}

impl NoteColumns {
    fn into_stored(self, conn: &Connection) -> RepoResult<StoredNote> {
        let id = Uuid::parse_str(&self.id).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{}` in notes.id", self.id))
        })?;
        let encrypted = match self.encrypted {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid encrypted value `{other}` in notes.encrypted"
                )));
            }
        };
        let tags = load_tags_for_note(conn, &self.id)?;

        Ok(StoredNote {
            id,
            title: self.title,
            content: self.content,
            encrypted,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn read_note_columns(row: &Row<'_>) -> rusqlite::Result<NoteColumns> {
    Ok(NoteColumns {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        encrypted: row.get("encrypted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn replace_tags_in_tx(tx: &Transaction<'_>, note_id: &str, tags: &[String]) -> RepoResult<()> {
    tx.execute("DELETE FROM note_tags WHERE note_id = ?1;", [note_id])?;
    for tag in tags {
        tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [tag.as_str()])?;
        tx.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag_id)
             SELECT ?1, id
             FROM tags
             WHERE name = ?2 COLLATE NOCASE;",
            params![note_id, tag.as_str()],
        )?;
    }
    Ok(())
}

fn load_tags_for_note(conn: &Connection, note_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM note_tags nt
         INNER JOIN tags t ON t.id = nt.tag_id
         WHERE nt.note_id = ?1
         ORDER BY t.name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        tags.push(value.to_lowercase());
    }
    Ok(tags)
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    const REQUIRED: &[(&str, &[&str])] = &[
        (
            "notes",
            &["id", "title", "content", "encrypted", "created_at", "updated_at"],
        ),
        ("tags", &["id", "name"]),
        ("note_tags", &["note_id", "tag_id"]),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
