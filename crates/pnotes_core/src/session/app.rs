//! Notes session driver.
//!
//! # Responsibility
//! - Drive the access controller against a `NoteStoreClient`.
//! - Keep the editor buffer in step with controller visibility.
//! - Cache the note list and surface store failures as a `Notice`.
//!
//! # Invariants
//! - The editor buffer exists iff the controller reports the editor visible.
//! - A failed list refresh keeps the previously loaded notes.
//! - A failed save leaves selection and editor untouched.

use crate::client::NoteStoreClient;
use crate::i18n::{I18n, Locale};
use crate::model::note::{Note, NoteId, Password};
use crate::session::controller::{
    AccessController, Completion, PromptSubmission, Refusal, UnlockRequest,
};
use crate::session::editor::EditorSession;
use crate::session::save::{route_save, SaveRouteError};
use crate::settings::SettingsResult;
use crate::view::list::{available_tags, list_item, NoteFilter, NoteListItem};
use log::{error, info, warn};

/// User-visible failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SaveFailed,
    DeleteFailed,
    SaveRejected(SaveRouteError),
}

impl Notice {
    pub fn message_key(self) -> &'static str {
        match self {
            Self::SaveFailed => "errors.saveFailed",
            Self::DeleteFailed => "errors.deleteFailed",
            Self::SaveRejected(err) => err.message_key(),
        }
    }
}

/// Where a save request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveProgress {
    /// Written; the editor is closed.
    Saved(NoteId),
    /// Waiting for a password from the create-mode prompt.
    AwaitingPassword,
    /// Refused before reaching the store.
    Rejected(SaveRouteError),
    /// The store write failed; the editor stays open.
    Failed,
    /// Nothing to save or a save is already running.
    Refused(Refusal),
}

/// Result of a password prompt submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Unlocked,
    IncorrectPassword,
    Save(SaveProgress),
    Refused(Refusal),
    Stale,
}

pub struct NotesApp<C: NoteStoreClient> {
    client: C,
    controller: AccessController,
    editor: Option<EditorSession>,
    notes: Vec<Note>,
    filter: NoteFilter,
    i18n: I18n,
    notice: Option<Notice>,
}

impl<C: NoteStoreClient> NotesApp<C> {
    pub fn new(client: C, i18n: I18n) -> Self {
        Self {
            client,
            controller: AccessController::new(),
            editor: None,
            notes: Vec::new(),
            filter: NoteFilter::default(),
            i18n,
            notice: None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn controller(&self) -> &AccessController {
        &self.controller
    }

    pub fn editor(&self) -> Option<&EditorSession> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorSession> {
        self.editor.as_mut()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn filter(&self) -> &NoteFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut NoteFilter {
        &mut self.filter
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    pub fn set_locale(&mut self, locale: Locale) -> SettingsResult<()> {
        self.i18n.set_locale(locale)
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Reloads the note list. On failure the previous list is kept.
    pub fn refresh(&mut self) {
        match self.client.list_notes() {
            Ok(notes) => self.notes = notes,
            Err(err) => {
                error!("event=notes_load module=session status=error error={err}");
            }
        }
    }

    /// Rows of the filtered list, in store order.
    pub fn list_items(&self) -> Vec<NoteListItem> {
        self.filter
            .apply(&self.notes)
            .into_iter()
            .map(|note| list_item(note, &self.i18n))
            .collect()
    }

    pub fn available_tags(&self) -> Vec<String> {
        available_tags(&self.notes)
    }

    /// Selects a note from the loaded list. Returns `false` for unknown ids.
    pub fn select_note(&mut self, id: NoteId) -> bool {
        let Some(note) = self.notes.iter().find(|note| note.id == id).cloned() else {
            return false;
        };
        self.controller.select(note);
        self.sync_editor();
        true
    }

    pub fn create_note(&mut self) {
        self.controller.create_new();
        self.sync_editor();
    }

    /// Closes the editor without saving.
    pub fn cancel_edit(&mut self) {
        self.controller.close_editor();
        self.sync_editor();
    }

    /// Fills the open prompt and submits it.
    pub fn submit_password(&mut self, password: &str, confirmation: &str) -> PromptOutcome {
        let Some(prompt) = self.controller.prompt_mut() else {
            return PromptOutcome::Refused(Refusal::NoPrompt);
        };
        prompt.set_password(password);
        prompt.set_confirmation(confirmation);

        match self.controller.submit_prompt() {
            Ok(PromptSubmission::Unlock(request)) => self.run_unlock(request),
            Ok(PromptSubmission::Save(password)) => {
                PromptOutcome::Save(self.dispatch_save(Some(password)))
            }
            Err(refusal) => PromptOutcome::Refused(refusal),
        }
    }

    pub fn cancel_password(&mut self) {
        self.controller.cancel_prompt();
        self.sync_editor();
    }

    /// Saves the editor buffer, asking for a password first when the note is
    /// or is becoming encrypted.
    pub fn save(&mut self) -> SaveProgress {
        let Some(editor) = self.editor.as_ref() else {
            return SaveProgress::Refused(Refusal::NoEditor);
        };
        if !editor.can_save() {
            return SaveProgress::Rejected(SaveRouteError::EmptyNote);
        }
        if editor.requires_password() {
            return match self.controller.open_save_prompt() {
                Ok(()) => SaveProgress::AwaitingPassword,
                Err(refusal) => SaveProgress::Refused(refusal),
            };
        }
        self.dispatch_save(None)
    }

    /// Deletes `id`, then clears any selection of it and reloads the list.
    pub fn delete_note(&mut self, id: NoteId) {
        match self.client.delete_note(id) {
            Ok(()) => info!("event=note_delete module=session status=ok note_id={id}"),
            Err(err) => {
                error!("event=note_delete module=session status=error note_id={id} error={err}");
                self.notice = Some(Notice::DeleteFailed);
            }
        }
        self.controller.apply_deleted(id);
        self.sync_editor();
        self.refresh();
    }

    fn run_unlock(&mut self, request: UnlockRequest) -> PromptOutcome {
        let UnlockRequest {
            ticket,
            note_id,
            password,
        } = request;
        let result = self.client.decrypt_note(note_id, &password);
        if let Err(err) = &result {
            warn!("event=note_decrypt module=session status=error note_id={note_id} error={err}");
        }
        let outcome = match self.controller.complete_unlock(ticket, result) {
            Completion::Applied => PromptOutcome::Unlocked,
            Completion::Failed => PromptOutcome::IncorrectPassword,
            Completion::Stale => PromptOutcome::Stale,
        };
        self.sync_editor();
        outcome
    }

    fn dispatch_save(&mut self, password: Option<Password>) -> SaveProgress {
        let Some(editor) = self.editor.as_ref() else {
            return SaveProgress::Refused(Refusal::NoEditor);
        };
        let request = editor.to_request(password, self.i18n.t("notes.noTitle"));
        let operation = match route_save(request) {
            Ok(operation) => operation,
            Err(err) => {
                warn!("event=note_save module=session status=rejected reason={err}");
                self.notice = Some(Notice::SaveRejected(err));
                return SaveProgress::Rejected(err);
            }
        };

        let ticket = match self.controller.begin_save() {
            Ok(ticket) => ticket,
            Err(refusal) => return SaveProgress::Refused(refusal),
        };
        let result = operation.execute(&mut self.client);
        let progress = match &result {
            Ok(note) => {
                info!(
                    "event=note_save module=session status=ok op={} note_id={}",
                    operation.kind(),
                    note.id
                );
                SaveProgress::Saved(note.id)
            }
            Err(err) => {
                error!(
                    "event=note_save module=session status=error op={} error={}",
                    operation.kind(),
                    err
                );
                self.notice = Some(Notice::SaveFailed);
                SaveProgress::Failed
            }
        };

        if self.controller.complete_save(ticket, result.is_ok()) == Completion::Applied {
            self.refresh();
        }
        self.sync_editor();
        progress
    }

    fn sync_editor(&mut self) {
        if !self.controller.editor_visible() {
            self.editor = None;
            return;
        }
        let generation = self.controller.generation();
        if self
            .editor
            .as_ref()
            .is_some_and(|editor| editor.generation() == generation)
        {
            return;
        }
        self.editor = Some(match self.controller.resolved() {
            Some(resolved) => EditorSession::from_resolved(resolved, generation),
            None => EditorSession::blank(generation),
        });
    }
}
