//! Core domain logic for pnotes, a notes store with password-protected notes.
//! This crate owns every invariant about when plaintext may exist.

pub mod client;
pub mod config;
pub mod crypto;
pub mod db;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod settings;
pub mod view;

pub use client::NoteStoreClient;
pub use config::{ConfigError, CoreConfig};
pub use crypto::{Argon2ChaCha, CryptoError, CryptoService, KdfParams};
pub use db::{open_db, open_db_in_memory, DbError};
pub use i18n::{I18n, Locale};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::note::{Note, NoteBody, NoteDraft, NoteId, Password, PlainText, ResolvedNote};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::{RepoError, RepoResult};
pub use service::legacy_import::{import_legacy_notes, ImportOutcome, ImportReport};
pub use service::note_service::{NoteService, NoteServiceError, ServiceResult};
pub use session::app::{Notice, NotesApp, PromptOutcome, SaveProgress};
pub use settings::{MemorySettingsStore, SettingsStore, SqliteSettingsStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
