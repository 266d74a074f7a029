//! Note store client that opens the database per call.
//!
//! # Invariants
//! - No connection outlives a single store operation.

use pnotes_core::db::open_db;
use pnotes_core::model::note::{Note, NoteDraft, NoteId, Password, ResolvedNote};
use pnotes_core::{
    Argon2ChaCha, NoteService, NoteStoreClient, RepoError, ServiceResult, SqliteNoteRepository,
};
use std::path::PathBuf;

type DbService<'conn> = NoteService<SqliteNoteRepository<'conn>, Argon2ChaCha>;

pub struct DbStoreClient {
    db_path: PathBuf,
    crypto: Argon2ChaCha,
}

impl DbStoreClient {
    pub fn new(db_path: impl Into<PathBuf>, crypto: Argon2ChaCha) -> Self {
        Self {
            db_path: db_path.into(),
            crypto,
        }
    }

    /// Runs `f` against a service bound to a fresh connection.
    pub fn with_service<T>(
        &self,
        f: impl FnOnce(&mut DbService<'_>) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let mut conn = open_db(&self.db_path).map_err(RepoError::from)?;
        let repo = SqliteNoteRepository::try_new(&mut conn)?;
        let mut service = NoteService::new(repo, self.crypto.clone());
        f(&mut service)
    }
}

impl NoteStoreClient for DbStoreClient {
    fn list_notes(&mut self) -> ServiceResult<Vec<Note>> {
        self.with_service(|service| service.list_notes())
    }

    fn decrypt_note(&mut self, id: NoteId, password: &Password) -> ServiceResult<ResolvedNote> {
        self.with_service(|service| service.decrypt_note(id, password))
    }

    fn create_plain(&mut self, draft: &NoteDraft) -> ServiceResult<Note> {
        self.with_service(|service| service.create_note(draft))
    }

    fn update_plain(&mut self, id: NoteId, draft: &NoteDraft) -> ServiceResult<Note> {
        self.with_service(|service| service.update_note(id, draft))
    }

    fn create_encrypted(&mut self, draft: &NoteDraft, password: &Password) -> ServiceResult<Note> {
        self.with_service(|service| service.create_encrypted_note(draft, password))
    }

    fn update_encrypted(
        &mut self,
        id: NoteId,
        draft: &NoteDraft,
        password: &Password,
    ) -> ServiceResult<Note> {
        self.with_service(|service| service.update_encrypted_note(id, draft, password))
    }

    fn delete_note(&mut self, id: NoteId) -> ServiceResult<()> {
        self.with_service(|service| service.delete_note(id))
    }
}
