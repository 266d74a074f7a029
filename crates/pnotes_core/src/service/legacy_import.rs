//! One-shot import of the legacy `notes.json` store.
//!
//! # Responsibility
//! - Move notes from the pre-SQLite JSON file into an empty note store.
//! - Rename the source to `notes.json.backup` once imported.
//!
//! # Invariants
//! - Import never runs against a store that already holds notes.
//! - Encrypted notes are copied as-is. `CryptoService::decrypt` still opens
//!   their envelopes; the next encrypted save re-seals them.

use crate::crypto::CryptoService;
use crate::model::note::normalize_tags;
use crate::repo::note_repo::{NoteRepository, StoredNote};
use crate::service::note_service::{now_ms, NoteService, NoteServiceError};
use chrono::DateTime;
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LEGACY_FILE_NAME: &str = "notes.json";
const BACKUP_SUFFIX: &str = ".backup";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyNote {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encrypted: bool,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Result of one import attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// No legacy file at the given path.
    NoSource,
    /// The store already has notes; the file is left untouched.
    StoreNotEmpty,
    /// The file exists but holds no notes; it is left untouched.
    Empty,
    Imported(ImportReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Notes written to the store, encrypted ones included.
    pub imported: usize,
    pub encrypted: usize,
    pub skipped_invalid: usize,
    pub backup_path: PathBuf,
}

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Service(NoteServiceError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "legacy import io error: {err}"),
            Self::Json(err) => write!(f, "legacy import parse error: {err}"),
            Self::Service(err) => write!(f, "legacy import store error: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Service(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<NoteServiceError> for ImportError {
    fn from(value: NoteServiceError) -> Self {
        Self::Service(value)
    }
}

/// Imports `path` into `service` when the store is empty.
pub fn import_legacy_notes<R: NoteRepository, C: CryptoService>(
    service: &mut NoteService<R, C>,
    path: &Path,
) -> Result<ImportOutcome, ImportError> {
    if !path.exists() {
        return Ok(ImportOutcome::NoSource);
    }
    if !service.is_empty()? {
        return Ok(ImportOutcome::StoreNotEmpty);
    }

    let raw = std::fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(ImportOutcome::Empty);
    }
    let legacy: Vec<LegacyNote> = serde_json::from_str(&raw)?;
    if legacy.is_empty() {
        return Ok(ImportOutcome::Empty);
    }

    let mut report = ImportReport::default();
    for note in legacy {
        if note.title.trim().is_empty() && note.content.trim().is_empty() {
            report.skipped_invalid += 1;
            continue;
        }
        let encrypted = note.encrypted;
        match service.insert_stored(legacy_to_stored(note)) {
            Ok(_) => {
                report.imported += 1;
                if encrypted {
                    report.encrypted += 1;
                }
            }
            Err(err) => {
                warn!("event=legacy_import module=service status=skip_note error={err}");
                report.skipped_invalid += 1;
            }
        }
    }

    let mut backup = path.as_os_str().to_owned();
    backup.push(BACKUP_SUFFIX);
    report.backup_path = PathBuf::from(backup);
    std::fs::rename(path, &report.backup_path)?;

    info!(
        "event=legacy_import module=service status=ok imported={} encrypted={} skipped_invalid={}",
        report.imported, report.encrypted, report.skipped_invalid
    );
    Ok(ImportOutcome::Imported(report))
}

fn legacy_to_stored(note: LegacyNote) -> StoredNote {
    let now = now_ms();
    let created_at = parse_timestamp(note.created_at.as_deref()).unwrap_or(now);
    let updated_at = parse_timestamp(note.updated_at.as_deref()).unwrap_or(created_at);
    StoredNote {
        id: Uuid::parse_str(note.id.trim()).unwrap_or_else(|_| Uuid::new_v4()),
        title: note.title,
        content: note.content,
        encrypted: note.encrypted,
        tags: normalize_tags(&note.tags.unwrap_or_default()),
        created_at,
        updated_at,
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<i64> {
    value
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|parsed| parsed.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;

    #[test]
    fn parses_rfc3339_timestamps_with_offsets() {
        assert_eq!(
            parse_timestamp(Some("2024-01-02T03:04:05Z")),
            Some(1_704_164_645_000)
        );
        assert_eq!(
            parse_timestamp(Some("2024-01-02T06:04:05.5+03:00")),
            Some(1_704_164_645_500)
        );
        assert_eq!(parse_timestamp(Some("yesterday")), None);
        assert_eq!(parse_timestamp(None), None);
    }
}
