//! Note use-case service.
//!
//! # Responsibility
//! - Provide the four write paths (plain/encrypted × create/update), decrypt,
//!   delete and list over a `NoteRepository`.
//! - Encrypt title and content separately before they reach storage.
//! - Map stored rows to the tagged `Note` shape.
//!
//! # Invariants
//! - Title and content are trimmed; a note with both blank is rejected.
//! - An encrypted note is never rewritten through the plain update path.
//! - `updated_at` strictly increases on every successful update.

use crate::crypto::{CryptoError, CryptoService};
use crate::model::note::{
    normalize_tags, Note, NoteBody, NoteDraft, NoteId, Password, PlainText, ResolvedNote, Sealed,
};
use crate::repo::note_repo::{NoteRepository, StoredNote};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Both title and content are blank after trimming.
    EmptyNote,
    /// An encrypted write or decrypt was attempted without a password.
    EmptyPassword,
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// A plain update targeted a note that is stored encrypted.
    EncryptedNoteRequiresPassword(NoteId),
    /// Wrong password or corrupted ciphertext.
    DecryptionFailed,
    /// Encryption or envelope failure other than authentication.
    Crypto(CryptoError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "title and content cannot both be empty"),
            Self::EmptyPassword => write!(f, "password cannot be empty"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::EncryptedNoteRequiresPassword(id) => {
                write!(f, "note {id} is encrypted and can only be saved with a password")
            }
            Self::DecryptionFailed => write!(f, "decryption failed"),
            Self::Crypto(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Crypto(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<CryptoError> for NoteServiceError {
    fn from(value: CryptoError) -> Self {
        match value {
            CryptoError::EmptyPassword => Self::EmptyPassword,
            CryptoError::Decryption => Self::DecryptionFailed,
            other => Self::Crypto(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over repository and crypto implementations.
pub struct NoteService<R: NoteRepository, C: CryptoService> {
    repo: R,
    crypto: C,
}

impl<R: NoteRepository, C: CryptoService> NoteService<R, C> {
    pub fn new(repo: R, crypto: C) -> Self {
        Self { repo, crypto }
    }

    /// Lists all notes, most recently updated first.
    pub fn list_notes(&self) -> ServiceResult<Vec<Note>> {
        Ok(self
            .repo
            .list_notes()?
            .into_iter()
            .map(stored_to_note)
            .collect())
    }

    /// Gets one note by id. Encrypted notes come back `Locked`.
    pub fn get_note(&self, id: NoteId) -> ServiceResult<Option<Note>> {
        Ok(self.repo.get_note(id)?.map(stored_to_note))
    }

    /// Returns whether the store holds no notes.
    pub fn is_empty(&self) -> ServiceResult<bool> {
        Ok(self.repo.count_notes()? == 0)
    }

    pub fn create_note(&mut self, draft: &NoteDraft) -> ServiceResult<Note> {
        let (title, content) = trimmed_text(draft)?.into_parts();
        let now = now_ms();
        let stored = StoredNote {
            id: Uuid::new_v4(),
            title,
            content,
            encrypted: false,
            tags: normalize_tags(&draft.tags),
            created_at: now,
            updated_at: now,
        };
        self.insert(stored)
    }

    pub fn create_encrypted_note(
        &mut self,
        draft: &NoteDraft,
        password: &Password,
    ) -> ServiceResult<Note> {
        if password.is_empty() {
            return Err(NoteServiceError::EmptyPassword);
        }
        let sealed = self.seal(&trimmed_text(draft)?, password)?;
        let now = now_ms();
        let stored = StoredNote {
            id: Uuid::new_v4(),
            title: sealed.title,
            content: sealed.content,
            encrypted: true,
            tags: normalize_tags(&draft.tags),
            created_at: now,
            updated_at: now,
        };
        self.insert(stored)
    }

    /// Replaces title, content and tags of an unencrypted note.
    pub fn update_note(&mut self, id: NoteId, draft: &NoteDraft) -> ServiceResult<Note> {
        let existing = self.require(id)?;
        if existing.encrypted {
            warn!("event=note_update module=service status=rejected note_id={id} reason=encrypted_note_plain_write");
            return Err(NoteServiceError::EncryptedNoteRequiresPassword(id));
        }
        let (title, content) = trimmed_text(draft)?.into_parts();
        let stored = StoredNote {
            title,
            content,
            encrypted: false,
            tags: normalize_tags(&draft.tags),
            updated_at: next_updated_at(existing.updated_at),
            ..existing
        };
        self.replace(stored)
    }

    /// Re-encrypts an encrypted note, or promotes an unencrypted one.
    pub fn update_encrypted_note(
        &mut self,
        id: NoteId,
        draft: &NoteDraft,
        password: &Password,
    ) -> ServiceResult<Note> {
        if password.is_empty() {
            return Err(NoteServiceError::EmptyPassword);
        }
        let existing = self.require(id)?;
        let promoted = !existing.encrypted;
        let sealed = self.seal(&trimmed_text(draft)?, password)?;
        let stored = StoredNote {
            title: sealed.title,
            content: sealed.content,
            encrypted: true,
            tags: normalize_tags(&draft.tags),
            updated_at: next_updated_at(existing.updated_at),
            ..existing
        };
        let note = self.replace(stored)?;
        if promoted {
            info!("event=note_promote module=service status=ok note_id={id}");
        }
        Ok(note)
    }

    /// Returns the plaintext of a note; unencrypted notes pass through.
    pub fn decrypt_note(&self, id: NoteId, password: &Password) -> ServiceResult<ResolvedNote> {
        if password.is_empty() {
            return Err(NoteServiceError::EmptyPassword);
        }
        let stored = self.require(id)?;
        if !stored.encrypted {
            return stored_to_note(stored)
                .resolve_plain()
                .ok_or(NoteServiceError::InconsistentState(
                    "plain note failed to resolve",
                ));
        }

        let title = self.crypto.decrypt(&stored.title, password)?;
        let content = self.crypto.decrypt(&stored.content, password)?;
        Ok(ResolvedNote {
            id: stored.id,
            encrypted: true,
            text: PlainText { title, content },
            tags: stored.tags,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    pub fn delete_note(&mut self, id: NoteId) -> ServiceResult<()> {
        self.repo.delete_note(id)?;
        info!("event=note_delete module=service status=ok note_id={id}");
        Ok(())
    }

    /// Inserts an already-shaped row; used by legacy import.
    pub(crate) fn insert_stored(&mut self, stored: StoredNote) -> ServiceResult<Note> {
        self.insert(stored)
    }

    fn insert(&mut self, stored: StoredNote) -> ServiceResult<Note> {
        let id = self.repo.create_note(&stored)?;
        let note = self
            .repo
            .get_note(id)?
            .map(stored_to_note)
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))?;
        info!(
            "event=note_create module=service status=ok note_id={} encrypted={}",
            id,
            note.is_encrypted()
        );
        Ok(note)
    }

    fn replace(&mut self, stored: StoredNote) -> ServiceResult<Note> {
        let id = stored.id;
        self.repo.update_note(&stored)?;
        let note = self
            .repo
            .get_note(id)?
            .map(stored_to_note)
            .ok_or(NoteServiceError::InconsistentState(
                "updated note not found in read-back",
            ))?;
        info!(
            "event=note_update module=service status=ok note_id={} encrypted={}",
            id,
            note.is_encrypted()
        );
        Ok(note)
    }

    fn require(&self, id: NoteId) -> ServiceResult<StoredNote> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    fn seal(&self, text: &PlainText, password: &Password) -> ServiceResult<Sealed> {
        let title = self.crypto.encrypt(&text.title, password)?;
        let content = self.crypto.encrypt(&text.content, password)?;
        Ok(Sealed::new(title, content))
    }
}

/// Maps a stored row to the tagged domain shape.
pub(crate) fn stored_to_note(stored: StoredNote) -> Note {
    let body = if stored.encrypted {
        NoteBody::Locked(Sealed::new(stored.title, stored.content))
    } else {
        NoteBody::Plain(PlainText {
            title: stored.title,
            content: stored.content,
        })
    };
    Note {
        id: stored.id,
        body,
        tags: stored.tags,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    }
}

fn trimmed_text(draft: &NoteDraft) -> ServiceResult<PlainText> {
    let text = PlainText::new(draft.text.title.trim(), draft.text.content.trim());
    if text.is_blank() {
        return Err(NoteServiceError::EmptyNote);
    }
    Ok(text)
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn next_updated_at(previous: i64) -> i64 {
    now_ms().max(previous + 1)
}
