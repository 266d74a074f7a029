//! Save routing.
//!
//! # Responsibility
//! - Map one save request to exactly one of the four store writes.
//! - Refuse any request that would store an encrypted note in plaintext.
//!
//! # Invariants
//! - An existing encrypted note is only ever written through
//!   `UpdateEncrypted`.
//! - Routing is pure; executing the chosen operation is a separate step.

use crate::client::NoteStoreClient;
use crate::model::note::{Note, NoteDraft, NoteId, Password};
use crate::service::note_service::ServiceResult;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Everything the editor knows at save time.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// `None` while creating a new note.
    pub note_id: Option<NoteId>,
    /// Whether the note being edited is stored encrypted.
    pub existing_encrypted: bool,
    pub encrypt_intent: bool,
    pub draft: NoteDraft,
    pub password: Option<Password>,
}

/// One concrete store write.
#[derive(Debug, Clone)]
pub enum SaveOperation {
    CreatePlain {
        draft: NoteDraft,
    },
    CreateEncrypted {
        draft: NoteDraft,
        password: Password,
    },
    UpdatePlain {
        id: NoteId,
        draft: NoteDraft,
    },
    UpdateEncrypted {
        id: NoteId,
        draft: NoteDraft,
        password: Password,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRouteError {
    /// Title and content are both blank.
    EmptyNote,
    /// The note is, or is becoming, encrypted and no password was given.
    PasswordRequired,
    /// An existing encrypted note arrived without its id.
    MissingNoteId,
}

impl SaveRouteError {
    pub fn message_key(self) -> &'static str {
        match self {
            Self::EmptyNote => "notes.emptyNote",
            Self::PasswordRequired => "password.required",
            Self::MissingNoteId => "errors.saveFailed",
        }
    }
}

impl Display for SaveRouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "title and content cannot both be empty"),
            Self::PasswordRequired => write!(f, "saving this note requires a password"),
            Self::MissingNoteId => write!(f, "encrypted note save is missing its note id"),
        }
    }
}

impl Error for SaveRouteError {}

/// Picks the store write for `request`.
pub fn route_save(request: SaveRequest) -> Result<SaveOperation, SaveRouteError> {
    let SaveRequest {
        note_id,
        existing_encrypted,
        encrypt_intent,
        draft,
        password,
    } = request;

    if draft.text.is_blank() {
        return Err(SaveRouteError::EmptyNote);
    }

    if existing_encrypted {
        let password = password.ok_or(SaveRouteError::PasswordRequired)?;
        let id = note_id.ok_or(SaveRouteError::MissingNoteId)?;
        return Ok(SaveOperation::UpdateEncrypted { id, draft, password });
    }

    if encrypt_intent {
        let password = password.ok_or(SaveRouteError::PasswordRequired)?;
        return Ok(match note_id {
            Some(id) => SaveOperation::UpdateEncrypted { id, draft, password },
            None => SaveOperation::CreateEncrypted { draft, password },
        });
    }

    Ok(match note_id {
        Some(id) => SaveOperation::UpdatePlain { id, draft },
        None => SaveOperation::CreatePlain { draft },
    })
}

impl SaveOperation {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreatePlain { .. } => "create_plain",
            Self::CreateEncrypted { .. } => "create_encrypted",
            Self::UpdatePlain { .. } => "update_plain",
            Self::UpdateEncrypted { .. } => "update_encrypted",
        }
    }

    /// Issues the chosen write against `client`.
    pub fn execute<C: NoteStoreClient + ?Sized>(&self, client: &mut C) -> ServiceResult<Note> {
        match self {
            Self::CreatePlain { draft } => client.create_plain(draft),
            Self::CreateEncrypted { draft, password } => client.create_encrypted(draft, password),
            Self::UpdatePlain { id, draft } => client.update_plain(*id, draft),
            Self::UpdateEncrypted {
                id,
                draft,
                password,
            } => client.update_encrypted(*id, draft, password),
        }
    }
}
