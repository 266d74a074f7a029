use pnotes_core::db::open_db_in_memory;
use pnotes_core::model::note::{Note, NoteDraft, NoteId, Password, ResolvedNote};
use pnotes_core::session::controller::Refusal;
use pnotes_core::session::prompt::{PromptError, PromptMode};
use pnotes_core::session::save::SaveRouteError;
use pnotes_core::{
    Argon2ChaCha, I18n, KdfParams, MemorySettingsStore, NoteService, NoteServiceError,
    NoteStoreClient, NotesApp, Notice, PromptOutcome, SaveProgress, ServiceResult,
    SqliteNoteRepository,
};
use rusqlite::Connection;
use std::collections::HashSet;

type Service<'conn> = NoteService<SqliteNoteRepository<'conn>, Argon2ChaCha>;

/// Records every call and fails the ones named in `failing`.
struct Recording<C> {
    inner: C,
    calls: Vec<&'static str>,
    failing: HashSet<&'static str>,
}

impl<C: NoteStoreClient> Recording<C> {
    fn enter(&mut self, call: &'static str) -> ServiceResult<()> {
        self.calls.push(call);
        if self.failing.contains(call) {
            return Err(NoteServiceError::InconsistentState("injected failure"));
        }
        Ok(())
    }
}

impl<C: NoteStoreClient> NoteStoreClient for Recording<C> {
    fn list_notes(&mut self) -> ServiceResult<Vec<Note>> {
        self.enter("list")?;
        self.inner.list_notes()
    }

    fn decrypt_note(&mut self, id: NoteId, password: &Password) -> ServiceResult<ResolvedNote> {
        self.enter("decrypt")?;
        self.inner.decrypt_note(id, password)
    }

    fn create_plain(&mut self, draft: &NoteDraft) -> ServiceResult<Note> {
        self.enter("create_plain")?;
        self.inner.create_plain(draft)
    }

    fn update_plain(&mut self, id: NoteId, draft: &NoteDraft) -> ServiceResult<Note> {
        self.enter("update_plain")?;
        self.inner.update_plain(id, draft)
    }

    fn create_encrypted(&mut self, draft: &NoteDraft, password: &Password) -> ServiceResult<Note> {
        self.enter("create_encrypted")?;
        self.inner.create_encrypted(draft, password)
    }

    fn update_encrypted(
        &mut self,
        id: NoteId,
        draft: &NoteDraft,
        password: &Password,
    ) -> ServiceResult<Note> {
        self.enter("update_encrypted")?;
        self.inner.update_encrypted(id, draft, password)
    }

    fn delete_note(&mut self, id: NoteId) -> ServiceResult<()> {
        self.enter("delete")?;
        self.inner.delete_note(id)
    }
}

fn service(conn: &mut Connection) -> Service<'_> {
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    NoteService::new(
        repo,
        Argon2ChaCha::new(KdfParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }),
    )
}

fn app(service: Service<'_>) -> NotesApp<Recording<Service<'_>>> {
    let client = Recording {
        inner: service,
        calls: Vec::new(),
        failing: HashSet::new(),
    };
    let mut app = NotesApp::new(client, I18n::load(Box::new(MemorySettingsStore::default())));
    app.refresh();
    app
}

fn calls<C: NoteStoreClient>(app: &NotesApp<Recording<C>>) -> &[&'static str] {
    &app.client().calls
}

fn assert_invariants<C: NoteStoreClient>(app: &NotesApp<C>) {
    let controller = app.controller();
    assert_eq!(controller.editor_visible(), app.editor().is_some());
    assert!(!(controller.is_creating() && controller.selected().is_some()));
    if let Some(resolved) = controller.resolved() {
        assert_eq!(controller.selected_id(), Some(resolved.id));
    }
    if let Some(selected) = controller.selected() {
        if !selected.is_encrypted() {
            assert!(controller.resolved().is_some());
        }
    }
}

fn draft(title: &str, content: &str) -> NoteDraft {
    NoteDraft::new(title, content, Vec::new())
}

#[test]
fn selecting_plain_note_opens_editor_without_prompt() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service.create_note(&draft("X", "Y")).unwrap();
    let mut app = app(service);

    assert!(app.select_note(note.id));
    assert_invariants(&app);
    assert!(app.controller().prompt().is_none());
    let editor = app.editor().unwrap();
    assert_eq!(editor.title(), "X");
    assert_eq!(editor.content(), "Y");
    assert!(!calls(&app).contains(&"decrypt"));
}

#[test]
fn encrypted_note_unlocks_only_with_correct_password() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service
        .create_encrypted_note(&draft("Secret", "hidden"), &Password::new("secret1"))
        .unwrap();
    let mut app = app(service);

    app.select_note(note.id);
    assert_invariants(&app);
    assert_eq!(app.controller().prompt().unwrap().mode(), PromptMode::Unlock);
    assert!(app.editor().is_none());

    assert_eq!(
        app.submit_password("wrong-pass", ""),
        PromptOutcome::IncorrectPassword
    );
    assert_invariants(&app);
    assert_eq!(
        app.controller().prompt().unwrap().error(),
        Some(PromptError::IncorrectPassword)
    );
    assert!(app.controller().resolved().is_none());
    assert!(app.editor().is_none());

    assert_eq!(app.submit_password("secret1", ""), PromptOutcome::Unlocked);
    assert_invariants(&app);
    assert!(app.controller().prompt().is_none());
    let editor = app.editor().unwrap();
    assert_eq!(editor.title(), "Secret");
    assert_eq!(editor.content(), "hidden");
    assert!(!editor.can_toggle_encrypt());
}

#[test]
fn store_failure_during_unlock_reads_as_incorrect_password() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service
        .create_encrypted_note(&draft("Secret", "hidden"), &Password::new("secret1"))
        .unwrap();
    let mut app = app(service);
    app.client_mut().failing.insert("decrypt");

    app.select_note(note.id);
    assert_eq!(
        app.submit_password("secret1", ""),
        PromptOutcome::IncorrectPassword
    );
    assert_invariants(&app);
    assert_eq!(
        app.controller().prompt().unwrap().error(),
        Some(PromptError::IncorrectPassword)
    );
    assert!(app.controller().resolved().is_none());
    assert!(app.editor().is_none());
    assert!(app.notice().is_none());

    app.client_mut().failing.remove("decrypt");
    assert_eq!(app.submit_password("secret1", ""), PromptOutcome::Unlocked);
    assert_eq!(app.editor().unwrap().content(), "hidden");
}

#[test]
fn cancelling_unlock_clears_selection_and_second_cancel_is_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service
        .create_encrypted_note(&draft("Secret", "hidden"), &Password::new("secret1"))
        .unwrap();
    let mut app = app(service);

    app.select_note(note.id);
    app.submit_password("wrong-pass", "");
    app.cancel_password();
    assert_invariants(&app);
    assert!(app.controller().selected().is_none());
    assert!(app.controller().resolved().is_none());
    assert!(app.editor().is_none());

    let generation = app.controller().generation();
    app.cancel_password();
    assert_eq!(app.controller().generation(), generation);
    assert!(app.controller().selected().is_none());
}

#[test]
fn invalid_prompt_input_never_reaches_the_store() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service
        .create_encrypted_note(&draft("Secret", "hidden"), &Password::new("secret1"))
        .unwrap();
    let mut app = app(service);

    app.select_note(note.id);
    assert_eq!(
        app.submit_password("abc", ""),
        PromptOutcome::Refused(Refusal::Invalid(PromptError::TooShort))
    );
    assert_eq!(
        app.submit_password("   ", ""),
        PromptOutcome::Refused(Refusal::Invalid(PromptError::Required))
    );
    assert!(!calls(&app).contains(&"decrypt"));
}

#[test]
fn new_note_with_encrypt_intent_is_created_encrypted() {
    let mut conn = open_db_in_memory().unwrap();
    let mut app = app(service(&mut conn));

    app.create_note();
    assert_invariants(&app);
    let editor = app.editor_mut().unwrap();
    editor.set_title("Plans");
    editor.set_content("surprise party");
    editor.set_encrypt_intent(true);

    assert_eq!(app.save(), SaveProgress::AwaitingPassword);
    assert_eq!(app.controller().prompt().unwrap().mode(), PromptMode::Create);
    assert_eq!(
        app.submit_password("secret1", "secret2"),
        PromptOutcome::Refused(Refusal::Invalid(PromptError::Mismatch))
    );

    let outcome = app.submit_password("secret1", "secret1");
    let PromptOutcome::Save(SaveProgress::Saved(id)) = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_invariants(&app);
    assert!(calls(&app).contains(&"create_encrypted"));
    assert!(!calls(&app).contains(&"create_plain"));
    assert!(app.editor().is_none());
    assert!(!app.controller().is_creating());

    let saved = app.notes().iter().find(|note| note.id == id).unwrap();
    assert!(saved.is_encrypted());
}

#[test]
fn editing_plain_note_updates_it_in_place() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service.create_note(&draft("Todo", "one")).unwrap();
    let mut app = app(service);

    app.select_note(note.id);
    app.editor_mut().unwrap().set_content("one, two");
    assert_eq!(app.save(), SaveProgress::Saved(note.id));
    assert_invariants(&app);
    assert!(calls(&app).contains(&"update_plain"));
    assert!(app.controller().selected().is_none());

    let reloaded = app.notes().iter().find(|n| n.id == note.id).unwrap();
    assert_eq!(reloaded.plaintext().unwrap().content, "one, two");
}

#[test]
fn unlocked_note_is_saved_back_encrypted() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service
        .create_encrypted_note(&draft("Secret", "v1"), &Password::new("secret1"))
        .unwrap();
    let mut app = app(service);

    app.select_note(note.id);
    app.submit_password("secret1", "");
    app.editor_mut().unwrap().set_content("v2");
    assert_eq!(app.save(), SaveProgress::AwaitingPassword);
    assert_eq!(
        app.submit_password("secret1", "secret1"),
        PromptOutcome::Save(SaveProgress::Saved(note.id))
    );
    assert!(calls(&app).contains(&"update_encrypted"));
    assert!(!calls(&app).contains(&"update_plain"));

    app.select_note(note.id);
    app.submit_password("secret1", "");
    assert_eq!(app.editor().unwrap().content(), "v2");
}

#[test]
fn cancelling_save_prompt_keeps_the_edit_buffer() {
    let mut conn = open_db_in_memory().unwrap();
    let mut app = app(service(&mut conn));

    app.create_note();
    let editor = app.editor_mut().unwrap();
    editor.set_title("draft");
    editor.set_encrypt_intent(true);
    app.save();
    app.cancel_password();

    assert_invariants(&app);
    assert_eq!(app.editor().unwrap().title(), "draft");
    assert!(app.controller().is_creating());
}

#[test]
fn deleting_selected_note_clears_selection_even_when_delete_fails() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service.create_note(&draft("Keep", "me")).unwrap();
    let mut app = app(service);

    app.select_note(note.id);
    app.client_mut().failing.insert("delete");
    app.delete_note(note.id);

    assert_invariants(&app);
    assert!(app.controller().selected().is_none());
    assert!(app.editor().is_none());
    assert_eq!(app.notice(), Some(Notice::DeleteFailed));
    let recorded = calls(&app);
    let delete_at = recorded.iter().rposition(|call| *call == "delete").unwrap();
    assert_eq!(recorded.get(delete_at + 1), Some(&"list"));
    assert_eq!(app.notes().len(), 1);
}

#[test]
fn deleting_other_note_keeps_current_selection() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let kept = service.create_note(&draft("Keep", "")).unwrap();
    let gone = service.create_note(&draft("Gone", "")).unwrap();
    let mut app = app(service);

    app.select_note(kept.id);
    app.delete_note(gone.id);
    assert_eq!(app.controller().selected_id(), Some(kept.id));
    assert!(app.editor().is_some());
    assert_eq!(app.notes().len(), 1);
}

#[test]
fn failed_save_keeps_editor_open_and_raises_notice() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let note = service.create_note(&draft("Todo", "one")).unwrap();
    let mut app = app(service);

    app.select_note(note.id);
    app.editor_mut().unwrap().set_content("unsaved");
    app.client_mut().failing.insert("update_plain");

    assert_eq!(app.save(), SaveProgress::Failed);
    assert_invariants(&app);
    assert_eq!(app.notice(), Some(Notice::SaveFailed));
    assert_eq!(app.controller().selected_id(), Some(note.id));
    assert_eq!(app.editor().unwrap().content(), "unsaved");
    assert!(!app.controller().save_in_flight());
}

#[test]
fn blank_note_is_rejected_before_any_store_call() {
    let mut conn = open_db_in_memory().unwrap();
    let mut app = app(service(&mut conn));

    app.create_note();
    app.editor_mut().unwrap().set_title("   ");
    assert_eq!(app.save(), SaveProgress::Rejected(SaveRouteError::EmptyNote));
    assert_eq!(calls(&app), ["list"]);
}

#[test]
fn untitled_note_gets_localized_placeholder_title() {
    let mut conn = open_db_in_memory().unwrap();
    let mut app = app(service(&mut conn));

    app.create_note();
    app.editor_mut().unwrap().set_content("body only");
    let SaveProgress::Saved(id) = app.save() else {
        panic!("save should succeed");
    };
    let saved = app.notes().iter().find(|note| note.id == id).unwrap();
    assert_eq!(saved.plaintext().unwrap().title, app.i18n().t("notes.noTitle"));
}

#[test]
fn failed_refresh_keeps_previous_notes() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    service.create_note(&draft("one", "")).unwrap();
    let mut app = app(service);
    assert_eq!(app.notes().len(), 1);

    app.client_mut().failing.insert("list");
    app.refresh();
    assert_eq!(app.notes().len(), 1);
}

#[test]
fn selecting_another_note_replaces_editor_contents() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let first = service.create_note(&draft("first", "")).unwrap();
    let second = service.create_note(&draft("second", "")).unwrap();
    let mut app = app(service);

    app.select_note(first.id);
    app.editor_mut().unwrap().set_title("edited");
    app.select_note(second.id);
    assert_invariants(&app);
    assert_eq!(app.editor().unwrap().title(), "second");
    assert!(!app.select_note(uuid::Uuid::new_v4()));
}
