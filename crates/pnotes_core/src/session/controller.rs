//! Encrypted note access controller.
//!
//! # Responsibility
//! - Own selection, resolved plaintext, the password prompt slot and the
//!   creating flag.
//! - Issue tickets for unlock and save calls and apply their completions.
//!
//! # Invariants
//! - The editor is visible iff `(selected and resolved) or is_creating`.
//! - `resolved` only holds plaintext for the current `selected` note.
//! - `selected` and `is_creating` are never both set.
//! - A completion issued under an older selection generation is discarded.
//! - At most one unlock and one save are in flight at a time.

use crate::model::note::{Note, NoteId, Password, ResolvedNote};
use crate::session::prompt::{PasswordPrompt, PromptError, PromptMode};
use log::{debug, info, warn};

/// Handle for one in-flight decrypt call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockTicket {
    generation: u64,
    note_id: NoteId,
}

impl UnlockTicket {
    pub fn note_id(&self) -> NoteId {
        self.note_id
    }
}

/// Handle for one in-flight save call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    generation: u64,
}

/// Decrypt call to issue after a validated unlock submission.
#[derive(Debug)]
pub struct UnlockRequest {
    pub ticket: UnlockTicket,
    pub note_id: NoteId,
    pub password: Password,
}

/// Outcome of a validated prompt submission.
#[derive(Debug)]
pub enum PromptSubmission {
    /// Issue a decrypt call for the selected note.
    Unlock(UnlockRequest),
    /// Continue the pending save with this password.
    Save(Password),
}

/// Why a submission or save was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// No prompt is open.
    NoPrompt,
    /// No editor is open.
    NoEditor,
    /// Local validation failed; the error is shown in the prompt.
    Invalid(PromptError),
    /// A call of the same kind is already in flight.
    Busy,
}

/// How a completion was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// Issued under an older selection; ignored.
    Stale,
}

#[derive(Debug, Default)]
pub struct AccessController {
    selected: Option<Note>,
    resolved: Option<ResolvedNote>,
    prompt: Option<PasswordPrompt>,
    is_creating: bool,
    generation: u64,
    pending_unlock: Option<UnlockTicket>,
    pending_save: Option<SaveTicket>,
}

impl AccessController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_ref()
    }

    pub fn selected_id(&self) -> Option<NoteId> {
        self.selected.as_ref().map(|note| note.id)
    }

    pub fn resolved(&self) -> Option<&ResolvedNote> {
        self.resolved.as_ref()
    }

    pub fn prompt(&self) -> Option<&PasswordPrompt> {
        self.prompt.as_ref()
    }

    pub fn prompt_mut(&mut self) -> Option<&mut PasswordPrompt> {
        self.prompt.as_mut()
    }

    pub fn is_creating(&self) -> bool {
        self.is_creating
    }

    /// Selection generation; bumped on every selection change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn unlock_in_flight(&self) -> bool {
        self.pending_unlock.is_some()
    }

    pub fn save_in_flight(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn editor_visible(&self) -> bool {
        (self.selected.is_some() && self.resolved.is_some()) || self.is_creating
    }

    /// Selects `note`. Locked notes open the unlock prompt.
    pub fn select(&mut self, note: Note) {
        self.advance();
        self.is_creating = false;
        match note.resolve_plain() {
            Some(resolved) => {
                self.resolved = Some(resolved);
                self.prompt = None;
            }
            None => {
                self.resolved = None;
                self.prompt = Some(PasswordPrompt::open(PromptMode::Unlock));
            }
        }
        debug!(
            "event=note_select module=session status=ok note_id={} encrypted={}",
            note.id,
            note.is_encrypted()
        );
        self.selected = Some(note);
    }

    /// Starts a new, unsaved note.
    pub fn create_new(&mut self) {
        self.advance();
        self.selected = None;
        self.resolved = None;
        self.prompt = None;
        self.is_creating = true;
    }

    /// Closes the editor without saving.
    pub fn close_editor(&mut self) {
        self.clear_selection();
    }

    /// Opens the create-mode prompt that collects a save password.
    pub fn open_save_prompt(&mut self) -> Result<(), Refusal> {
        if !self.editor_visible() {
            return Err(Refusal::NoEditor);
        }
        if self.pending_save.is_some() {
            return Err(Refusal::Busy);
        }
        self.prompt = Some(PasswordPrompt::open(PromptMode::Create));
        Ok(())
    }

    /// Validates the open prompt and returns the call to make next.
    ///
    /// A save prompt closes on success; an unlock prompt stays open until
    /// its decrypt call completes.
    pub fn submit_prompt(&mut self) -> Result<PromptSubmission, Refusal> {
        let prompt = self.prompt.as_mut().ok_or(Refusal::NoPrompt)?;
        match prompt.mode() {
            PromptMode::Create => {
                let password = prompt.submit().map_err(Refusal::Invalid)?;
                self.prompt = None;
                Ok(PromptSubmission::Save(password))
            }
            PromptMode::Unlock => {
                if self.pending_unlock.is_some() {
                    return Err(Refusal::Busy);
                }
                let password = prompt.submit().map_err(Refusal::Invalid)?;
                let note_id = self
                    .selected
                    .as_ref()
                    .map(|note| note.id)
                    .ok_or(Refusal::NoPrompt)?;
                let ticket = UnlockTicket {
                    generation: self.generation,
                    note_id,
                };
                self.pending_unlock = Some(ticket);
                Ok(PromptSubmission::Unlock(UnlockRequest {
                    ticket,
                    note_id,
                    password,
                }))
            }
        }
    }

    /// Applies the result of a decrypt call.
    pub fn complete_unlock<E>(
        &mut self,
        ticket: UnlockTicket,
        result: Result<ResolvedNote, E>,
    ) -> Completion {
        if self.pending_unlock == Some(ticket) {
            self.pending_unlock = None;
        }
        if !self.is_current_unlock(ticket) {
            debug!(
                "event=note_unlock module=session status=stale note_id={}",
                ticket.note_id
            );
            return Completion::Stale;
        }

        match result {
            Ok(resolved) if resolved.id == ticket.note_id => {
                self.resolved = Some(resolved);
                self.prompt = None;
                info!(
                    "event=note_unlock module=session status=ok note_id={}",
                    ticket.note_id
                );
                Completion::Applied
            }
            _ => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.set_error(PromptError::IncorrectPassword);
                }
                warn!(
                    "event=note_unlock module=session status=error note_id={}",
                    ticket.note_id
                );
                Completion::Failed
            }
        }
    }

    /// Closes the open prompt.
    ///
    /// Cancelling an unlock also drops the selection; cancelling a save
    /// prompt leaves the editor open. No-op when no prompt is open.
    pub fn cancel_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        if prompt.mode() == PromptMode::Unlock {
            self.clear_selection();
        }
    }

    /// Starts a save call for the open editor.
    pub fn begin_save(&mut self) -> Result<SaveTicket, Refusal> {
        if !self.editor_visible() {
            return Err(Refusal::NoEditor);
        }
        if self.pending_save.is_some() {
            return Err(Refusal::Busy);
        }
        let ticket = SaveTicket {
            generation: self.generation,
        };
        self.pending_save = Some(ticket);
        Ok(ticket)
    }

    /// Applies the result of a save call. Success closes the editor.
    pub fn complete_save(&mut self, ticket: SaveTicket, succeeded: bool) -> Completion {
        if self.pending_save == Some(ticket) {
            self.pending_save = None;
        }
        if ticket.generation != self.generation {
            return Completion::Stale;
        }
        if succeeded {
            self.clear_selection();
            Completion::Applied
        } else {
            Completion::Failed
        }
    }

    /// Applies a finished delete of `id`, whatever its outcome.
    pub fn apply_deleted(&mut self, id: NoteId) {
        if self.selected_id() == Some(id) {
            self.clear_selection();
        }
    }

    fn is_current_unlock(&self, ticket: UnlockTicket) -> bool {
        ticket.generation == self.generation
            && self.selected_id() == Some(ticket.note_id)
            && self
                .prompt
                .as_ref()
                .is_some_and(|prompt| prompt.mode() == PromptMode::Unlock)
    }

    fn clear_selection(&mut self) {
        self.advance();
        self.selected = None;
        self.resolved = None;
        self.prompt = None;
        self.is_creating = false;
    }

    fn advance(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending_unlock = None;
        self.pending_save = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessController, Completion, PromptSubmission, Refusal};
    use crate::model::note::{Note, NoteBody, PlainText, ResolvedNote, Sealed};
    use crate::session::prompt::{PromptError, PromptMode};
    use uuid::Uuid;

    fn plain(title: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            body: NoteBody::Plain(PlainText::new(title, "body")),
            tags: Vec::new(),
            created_at: 1,
            updated_at: 1,
        }
    }

    fn locked() -> Note {
        Note {
            id: Uuid::new_v4(),
            body: NoteBody::Locked(Sealed::new("c1".into(), "c2".into())),
            tags: Vec::new(),
            created_at: 1,
            updated_at: 1,
        }
    }

    fn resolved_for(note: &Note) -> ResolvedNote {
        ResolvedNote {
            id: note.id,
            encrypted: true,
            text: PlainText::new("T", "C"),
            tags: Vec::new(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }

    fn submit_unlock(controller: &mut AccessController, password: &str) -> super::UnlockRequest {
        controller.prompt_mut().unwrap().set_password(password);
        match controller.submit_prompt().unwrap() {
            PromptSubmission::Unlock(request) => request,
            PromptSubmission::Save(_) => panic!("expected unlock submission"),
        }
    }

    #[test]
    fn busy_unlock_refuses_second_submission() {
        let note = locked();
        let mut controller = AccessController::new();
        controller.select(note);
        let _first = submit_unlock(&mut controller, "secret1");
        controller.prompt_mut().unwrap().set_password("secret1");
        assert_eq!(controller.submit_prompt().unwrap_err(), Refusal::Busy);
    }

    #[test]
    fn unlock_completion_after_cancel_is_stale() {
        let note = locked();
        let mut controller = AccessController::new();
        controller.select(note.clone());
        let request = submit_unlock(&mut controller, "secret1");
        controller.cancel_prompt();

        let completion = controller.complete_unlock::<()>(request.ticket, Ok(resolved_for(&note)));
        assert_eq!(completion, Completion::Stale);
        assert!(controller.resolved().is_none());
        assert!(!controller.editor_visible());
    }

    #[test]
    fn unlock_of_previous_selection_is_discarded_after_switching_notes() {
        let first = locked();
        let second = locked();
        let mut controller = AccessController::new();
        controller.select(first.clone());
        let request = submit_unlock(&mut controller, "secret1");
        assert!(controller.unlock_in_flight());

        controller.select(second.clone());
        assert!(!controller.unlock_in_flight());
        let completion = controller.complete_unlock::<()>(request.ticket, Ok(resolved_for(&first)));
        assert_eq!(completion, Completion::Stale);
        assert!(controller.resolved().is_none());
        assert_eq!(controller.selected_id(), Some(second.id));
        let prompt = controller.prompt().unwrap();
        assert_eq!(prompt.mode(), PromptMode::Unlock);
        assert_eq!(prompt.error(), None);

        let retry = submit_unlock(&mut controller, "secret1");
        assert_eq!(retry.note_id, second.id);
        assert_eq!(
            controller.complete_unlock::<()>(retry.ticket, Ok(resolved_for(&second))),
            Completion::Applied
        );
        assert_eq!(controller.resolved().map(|note| note.id), Some(second.id));
    }

    #[test]
    fn reselecting_the_same_note_discards_its_pending_unlock() {
        let note = locked();
        let mut controller = AccessController::new();
        controller.select(note.clone());
        let request = submit_unlock(&mut controller, "secret1");

        controller.select(note.clone());
        let completion = controller.complete_unlock::<()>(request.ticket, Ok(resolved_for(&note)));
        assert_eq!(completion, Completion::Stale);
        assert!(controller.resolved().is_none());
        assert_eq!(controller.selected_id(), Some(note.id));
        assert!(controller.prompt().is_some());
        assert!(!controller.unlock_in_flight());
    }

    #[test]
    fn save_prompt_cancel_keeps_editor_open() {
        let mut controller = AccessController::new();
        controller.create_new();
        controller.open_save_prompt().unwrap();
        assert_eq!(controller.prompt().unwrap().mode(), PromptMode::Create);
        controller.cancel_prompt();
        assert!(controller.prompt().is_none());
        assert!(controller.editor_visible());
    }

    #[test]
    fn save_prompt_requires_matching_confirmation() {
        let mut controller = AccessController::new();
        controller.select(plain("x"));
        controller.open_save_prompt().unwrap();
        let prompt = controller.prompt_mut().unwrap();
        prompt.set_password("secret1");
        prompt.set_confirmation("secret2");
        assert_eq!(
            controller.submit_prompt().unwrap_err(),
            Refusal::Invalid(PromptError::Mismatch)
        );
        assert!(controller.prompt().is_some());
    }

    #[test]
    fn save_completion_after_reselection_is_stale() {
        let mut controller = AccessController::new();
        controller.select(plain("a"));
        let ticket = controller.begin_save().unwrap();
        assert_eq!(controller.begin_save().unwrap_err(), Refusal::Busy);
        let other = plain("b");
        controller.select(other.clone());
        assert_eq!(controller.complete_save(ticket, true), Completion::Stale);
        assert_eq!(controller.selected_id(), Some(other.id));
    }

    #[test]
    fn failed_save_leaves_editor_open() {
        let mut controller = AccessController::new();
        controller.create_new();
        let ticket = controller.begin_save().unwrap();
        assert_eq!(controller.complete_save(ticket, false), Completion::Failed);
        assert!(controller.is_creating());
        assert!(!controller.save_in_flight());
    }

    #[test]
    fn open_save_prompt_requires_editor() {
        let mut controller = AccessController::new();
        assert_eq!(controller.open_save_prompt().unwrap_err(), Refusal::NoEditor);
        assert_eq!(controller.submit_prompt().unwrap_err(), Refusal::NoPrompt);
    }
}
