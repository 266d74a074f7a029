//! Editor session buffer.
//!
//! # Responsibility
//! - Hold the editable title, content, tags and encrypt-intent of one note.
//! - Build the `SaveRequest` handed to save routing.
//!
//! # Invariants
//! - Seeded only from `ResolvedNote` or blank; never from a locked note.
//! - Encrypt-intent cannot be turned off for a note stored encrypted.
//! - Buffer text is wiped on drop.

use crate::model::note::{normalize_tag, NoteDraft, NoteId, Password, ResolvedNote};
use crate::session::save::SaveRequest;
use zeroize::Zeroize;

#[derive(Debug)]
pub struct EditorSession {
    note_id: Option<NoteId>,
    existing_encrypted: bool,
    title: String,
    content: String,
    tags: Vec<String>,
    encrypt_intent: bool,
    generation: u64,
}

impl EditorSession {
    /// Empty buffer for a new note.
    pub fn blank(generation: u64) -> Self {
        Self {
            note_id: None,
            existing_encrypted: false,
            title: String::new(),
            content: String::new(),
            tags: Vec::new(),
            encrypt_intent: false,
            generation,
        }
    }

    /// Buffer seeded from resolved plaintext.
    pub fn from_resolved(note: &ResolvedNote, generation: u64) -> Self {
        Self {
            note_id: Some(note.id),
            existing_encrypted: note.encrypted,
            title: note.text.title.clone(),
            content: note.text.content.clone(),
            tags: note.tags.clone(),
            encrypt_intent: note.encrypted,
            generation,
        }
    }

    pub fn note_id(&self) -> Option<NoteId> {
        self.note_id
    }

    /// Controller generation this buffer was seeded under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_existing_encrypted(&self) -> bool {
        self.existing_encrypted
    }

    pub fn encrypt_intent(&self) -> bool {
        self.encrypt_intent
    }

    pub fn set_title(&mut self, title: &str) {
        self.title.zeroize();
        self.title = title.to_string();
    }

    pub fn set_content(&mut self, content: &str) {
        self.content.zeroize();
        self.content = content.to_string();
    }

    /// Adds a normalized tag. Returns `false` for blank or duplicate values.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let Some(tag) = normalize_tag(tag) else {
            return false;
        };
        match self.tags.binary_search(&tag) {
            Ok(_) => false,
            Err(position) => {
                self.tags.insert(position, tag);
                true
            }
        }
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let Some(tag) = normalize_tag(tag) else {
            return false;
        };
        let before = self.tags.len();
        self.tags.retain(|existing| existing != &tag);
        before != self.tags.len()
    }

    /// Whether the encrypt toggle is offered at all.
    pub fn can_toggle_encrypt(&self) -> bool {
        !self.existing_encrypted
    }

    /// Sets encrypt-intent; ignored for notes already stored encrypted.
    pub fn set_encrypt_intent(&mut self, value: bool) {
        if self.can_toggle_encrypt() {
            self.encrypt_intent = value;
        }
    }

    /// Whether saving must go through the password prompt.
    pub fn requires_password(&self) -> bool {
        self.existing_encrypted || self.encrypt_intent
    }

    pub fn can_save(&self) -> bool {
        !(self.title.trim().is_empty() && self.content.trim().is_empty())
    }

    /// Builds the save request; a blank title becomes `untitled`.
    pub fn to_request(&self, password: Option<Password>, untitled: &str) -> SaveRequest {
        let title = if self.title.trim().is_empty() && !self.content.trim().is_empty() {
            untitled
        } else {
            self.title.as_str()
        };
        SaveRequest {
            note_id: self.note_id,
            existing_encrypted: self.existing_encrypted,
            encrypt_intent: self.encrypt_intent,
            draft: NoteDraft::new(title, self.content.as_str(), self.tags.clone()),
            password,
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.title.zeroize();
        self.content.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::EditorSession;
    use crate::model::note::{PlainText, ResolvedNote};
    use uuid::Uuid;

    fn resolved(encrypted: bool) -> ResolvedNote {
        ResolvedNote {
            id: Uuid::new_v4(),
            encrypted,
            text: PlainText::new("T", "C"),
            tags: vec!["work".to_string()],
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn encrypted_note_keeps_intent_locked_on() {
        let mut editor = EditorSession::from_resolved(&resolved(true), 1);
        assert!(!editor.can_toggle_encrypt());
        editor.set_encrypt_intent(false);
        assert!(editor.encrypt_intent());
        assert!(editor.requires_password());
    }

    #[test]
    fn plain_note_toggle_controls_password_requirement() {
        let mut editor = EditorSession::from_resolved(&resolved(false), 1);
        assert!(!editor.requires_password());
        editor.set_encrypt_intent(true);
        assert!(editor.requires_password());
    }

    #[test]
    fn tags_are_normalized_and_kept_sorted() {
        let mut editor = EditorSession::blank(0);
        assert!(editor.add_tag(" Zeta "));
        assert!(editor.add_tag("alpha"));
        assert!(!editor.add_tag("ZETA"));
        assert!(!editor.add_tag("   "));
        assert_eq!(editor.tags(), ["alpha".to_string(), "zeta".to_string()]);
        assert!(editor.remove_tag("Alpha"));
        assert!(!editor.remove_tag("alpha"));
    }

    #[test]
    fn blank_title_gets_placeholder_only_when_content_present() {
        let mut editor = EditorSession::blank(0);
        editor.set_content("just a body");
        let request = editor.to_request(None, "Untitled");
        assert_eq!(request.draft.text.title, "Untitled");

        let empty = EditorSession::blank(0);
        assert!(!empty.can_save());
        assert_eq!(empty.to_request(None, "Untitled").draft.text.title, "");
    }
}
