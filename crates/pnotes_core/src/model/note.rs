//! Note domain model.
//!
//! # Responsibility
//! - Define the store-facing `Note` record and its tagged `NoteBody`.
//! - Define `ResolvedNote`, the only shape carrying guaranteed plaintext.
//! - Own tag normalization rules shared by store and editor.
//!
//! # Invariants
//! - `Note::is_encrypted()` is derived from the body variant, never stored
//!   separately.
//! - A `Sealed` body can only be constructed and read inside this crate.
//! - Tags are lowercase, trimmed, deduplicated and sorted.

use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Stable identifier of a note, assigned by the Note Store.
pub type NoteId = Uuid;

/// Plaintext title and content of a note. Wiped on drop.
#[derive(Clone, PartialEq, Eq, Default, Zeroize, ZeroizeOnDrop)]
pub struct PlainText {
    pub title: String,
    pub content: String,
}

impl PlainText {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Moves title and content out, leaving `self` empty.
    pub fn into_parts(mut self) -> (String, String) {
        (
            std::mem::take(&mut self.title),
            std::mem::take(&mut self.content),
        )
    }

    /// Returns whether both title and content are blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

impl Debug for PlainText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainText")
            .field("title_chars", &self.title.chars().count())
            .field("content_chars", &self.content.chars().count())
            .finish()
    }
}

/// Ciphertext of an encrypted note as persisted by the store.
#[derive(Clone, PartialEq, Eq)]
pub struct Sealed {
    pub(crate) title: String,
    pub(crate) content: String,
}

impl Sealed {
    pub(crate) fn new(title: String, content: String) -> Self {
        Self { title, content }
    }
}

impl Debug for Sealed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Sealed(..)")
    }
}

/// Body of a stored note, keyed by its protection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBody {
    /// Unencrypted note; title and content are readable.
    Plain(PlainText),
    /// Encrypted note; only reachable through an unlock.
    Locked(Sealed),
}

/// Note record as returned by the Note Store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub body: NoteBody,
    /// Normalized tags, alphabetical.
    pub tags: Vec<String>,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Last update timestamp in epoch milliseconds.
    pub updated_at: i64,
}

impl Note {
    /// Returns whether this note is stored encrypted.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.body, NoteBody::Locked(_))
    }

    /// Returns plaintext for unencrypted notes, `None` for locked ones.
    pub fn plaintext(&self) -> Option<&PlainText> {
        match &self.body {
            NoteBody::Plain(text) => Some(text),
            NoteBody::Locked(_) => None,
        }
    }

    /// Builds the resolved view of an unencrypted note.
    ///
    /// Returns `None` for locked notes; those resolve only through decrypt.
    pub fn resolve_plain(&self) -> Option<ResolvedNote> {
        self.plaintext().map(|text| ResolvedNote {
            id: self.id,
            encrypted: false,
            text: text.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A note whose title and content are guaranteed plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNote {
    pub id: NoteId,
    /// Whether the stored note is encrypted (true after a successful unlock).
    pub encrypted: bool,
    pub text: PlainText,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Editable fields submitted with a save.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteDraft {
    pub text: PlainText,
    pub tags: Vec<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            text: PlainText::new(title, content),
            tags,
        }
    }
}

/// Password supplied by the user; wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Normalizes one tag value: trimmed and lowercase, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag.as_ref()) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}
