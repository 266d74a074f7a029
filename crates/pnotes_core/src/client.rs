//! Note Store Client contract consumed by the notes session.
//!
//! # Responsibility
//! - Name the seven store operations the session may issue.
//! - Adapt `NoteService` to that contract.
//!
//! # Invariants
//! - The session never talks to a repository or crypto service directly.
//! - Decrypt failures are opaque to callers: wrong password and transport
//!   errors look the same.

use crate::crypto::CryptoService;
use crate::model::note::{Note, NoteDraft, NoteId, Password, ResolvedNote};
use crate::repo::note_repo::NoteRepository;
use crate::service::note_service::{NoteService, ServiceResult};

/// Store operations issued by the notes session.
pub trait NoteStoreClient {
    fn list_notes(&mut self) -> ServiceResult<Vec<Note>>;
    fn decrypt_note(&mut self, id: NoteId, password: &Password) -> ServiceResult<ResolvedNote>;
    fn create_plain(&mut self, draft: &NoteDraft) -> ServiceResult<Note>;
    fn update_plain(&mut self, id: NoteId, draft: &NoteDraft) -> ServiceResult<Note>;
    fn create_encrypted(&mut self, draft: &NoteDraft, password: &Password)
        -> ServiceResult<Note>;
    fn update_encrypted(
        &mut self,
        id: NoteId,
        draft: &NoteDraft,
        password: &Password,
    ) -> ServiceResult<Note>;
    fn delete_note(&mut self, id: NoteId) -> ServiceResult<()>;
}

impl<R: NoteRepository, C: CryptoService> NoteStoreClient for NoteService<R, C> {
    fn list_notes(&mut self) -> ServiceResult<Vec<Note>> {
        NoteService::list_notes(self)
    }

    fn decrypt_note(&mut self, id: NoteId, password: &Password) -> ServiceResult<ResolvedNote> {
        NoteService::decrypt_note(self, id, password)
    }

    fn create_plain(&mut self, draft: &NoteDraft) -> ServiceResult<Note> {
        self.create_note(draft)
    }

    fn update_plain(&mut self, id: NoteId, draft: &NoteDraft) -> ServiceResult<Note> {
        self.update_note(id, draft)
    }

    fn create_encrypted(
        &mut self,
        draft: &NoteDraft,
        password: &Password,
    ) -> ServiceResult<Note> {
        self.create_encrypted_note(draft, password)
    }

    fn update_encrypted(
        &mut self,
        id: NoteId,
        draft: &NoteDraft,
        password: &Password,
    ) -> ServiceResult<Note> {
        self.update_encrypted_note(id, draft, password)
    }

    fn delete_note(&mut self, id: NoteId) -> ServiceResult<()> {
        NoteService::delete_note(self, id)
    }
}
