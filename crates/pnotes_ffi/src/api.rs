//! FFI use-case API for the notes UI.
//!
//! # Responsibility
//! - Expose the notes session to Dart via FRB as sync calls.
//! - Return one view snapshot per call so the UI never holds core state.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Snapshots never carry ciphertext or passwords; plaintext only appears in
//!   `editor` after a successful unlock.
//! - One process-wide session, guarded by a mutex.

use crate::store::DbStoreClient;
use log::{error, info, warn};
use pnotes_core::db::open_db;
use pnotes_core::session::prompt::PromptMode;
use pnotes_core::view::list::EncryptionFilter;
use pnotes_core::{
    core_version as core_version_inner, import_legacy_notes, init_logging as init_logging_inner,
    Argon2ChaCha, CoreConfig, I18n, ImportOutcome, Locale, NoteId, NoteService, NotesApp,
    PromptOutcome, SaveProgress, SqliteNoteRepository, SqliteSettingsStore,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

type Session = NotesApp<DbStoreClient>;

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Row of the note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRowView {
    pub id: String,
    pub encrypted: bool,
    pub title: String,
    pub preview: String,
    pub tags: Vec<String>,
    pub updated_label: String,
}

/// Open editor buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    /// `None` while creating a new note.
    pub note_id: Option<String>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub encrypt_intent: bool,
    /// Whether the encrypt toggle is shown.
    pub can_toggle_encrypt: bool,
}

/// Open password prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    /// `create` or `unlock`.
    pub mode: String,
    /// Localized inline error, if any.
    pub error: Option<String>,
}

/// Full UI state after one call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotesViewState {
    pub locale: String,
    pub notes: Vec<NoteRowView>,
    pub available_tags: Vec<String>,
    pub selected_tags: Vec<String>,
    /// Current text of the tag search box.
    pub tag_search: String,
    /// `all`, `encrypted` or `unencrypted`.
    pub encryption_filter: String,
    pub editor: Option<EditorView>,
    pub prompt: Option<PromptView>,
    /// Localized user-visible error, if any.
    pub notice: Option<String>,
    /// An unlock or save is waiting for its result.
    pub busy: bool,
    /// Non-empty when the call itself could not run.
    pub error: String,
}

impl NotesViewState {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            ..Self::default()
        }
    }
}

/// Opens the note store and starts the session.
///
/// `data_dir` overrides the resolved data directory when non-empty; it must
/// be an absolute path.
/// A legacy `notes.json` in the data directory is imported into an empty
/// store. Calling again replaces the current session.
///
/// # FFI contract
/// - Sync call; performs file-system and database setup.
/// - Never panics; failures are reported in `error`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_init(data_dir: Option<String>) -> NotesViewState {
    let config = match data_dir.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => CoreConfig::with_data_dir(dir),
        _ => CoreConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => return NotesViewState::failure(format!("notes_init failed: {err}")),
    };
    match start_session(&config) {
        Ok(app) => {
            let mut guard = lock_session();
            *guard = Some(app);
            guard.as_ref().map_or_else(NotesViewState::default, snapshot)
        }
        Err(message) => {
            error!("event=session_init module=ffi status=error error={message}");
            NotesViewState::failure(format!("notes_init failed: {message}"))
        }
    }
}

/// Returns the current view state without changing it.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_view() -> NotesViewState {
    with_session(|_| {})
}

/// Reloads the note list from the store.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_refresh() -> NotesViewState {
    with_session(|app| app.refresh())
}

/// Selects a note; encrypted notes open the unlock prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_select(note_id: String) -> NotesViewState {
    with_note_id(&note_id, |app, id| {
        if !app.select_note(id) {
            warn!("event=note_select module=ffi status=error reason=unknown_id");
        }
    })
}

/// Submits the open password prompt.
///
/// `confirmation` is ignored by unlock prompts.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_submit_password(password: String, confirmation: String) -> NotesViewState {
    with_session(|app| {
        let outcome = app.submit_password(&password, &confirmation);
        if matches!(outcome, PromptOutcome::Stale) {
            warn!("event=prompt_submit module=ffi status=stale");
        }
    })
}

/// Closes the open password prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_cancel_password() -> NotesViewState {
    with_session(|app| app.cancel_password())
}

/// Opens an empty editor for a new note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create() -> NotesViewState {
    with_session(|app| app.create_note())
}

/// Replaces title and content of the open editor.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_edit(title: String, content: String) -> NotesViewState {
    with_session(|app| {
        if let Some(editor) = app.editor_mut() {
            editor.set_title(&title);
            editor.set_content(&content);
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_add_tag(tag: String) -> NotesViewState {
    with_session(|app| {
        if let Some(editor) = app.editor_mut() {
            editor.add_tag(&tag);
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_remove_tag(tag: String) -> NotesViewState {
    with_session(|app| {
        if let Some(editor) = app.editor_mut() {
            editor.remove_tag(&tag);
        }
    })
}

/// Sets encrypt-intent; ignored for notes already stored encrypted.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_set_encrypt(encrypt: bool) -> NotesViewState {
    with_session(|app| {
        if let Some(editor) = app.editor_mut() {
            editor.set_encrypt_intent(encrypt);
        }
    })
}

/// Saves the open editor, or opens the password prompt first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_save() -> NotesViewState {
    with_session(|app| {
        if let SaveProgress::Refused(refusal) = app.save() {
            warn!("event=note_save module=ffi status=refused reason={refusal:?}");
        }
    })
}

/// Closes the editor without saving.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_cancel_edit() -> NotesViewState {
    with_session(|app| app.cancel_edit())
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(note_id: String) -> NotesViewState {
    with_note_id(&note_id, |app, id| app.delete_note(id))
}

/// Sets the encryption filter: `all`, `encrypted` or `unencrypted`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_set_encryption_filter(filter: String) -> NotesViewState {
    let Some(filter) = parse_encryption_filter(&filter) else {
        return NotesViewState::failure(format!("unknown encryption filter `{filter}`"));
    };
    with_session(|app| app.filter_mut().encryption = filter)
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_toggle_tag_filter(tag: String) -> NotesViewState {
    with_session(|app| app.filter_mut().toggle_tag(&tag))
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_clear_filters() -> NotesViewState {
    with_session(|app| app.filter_mut().clear())
}

/// Matching tags for the filter panel search box.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_search_tags(query: String) -> Vec<String> {
    let mut guard = lock_session();
    let Some(app) = guard.as_mut() else {
        return Vec::new();
    };
    app.filter_mut().set_tag_search(&query);
    let available = app.available_tags();
    app.filter()
        .searchable_tags(&available)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Locale codes the UI can switch to.
#[flutter_rust_bridge::frb(sync)]
pub fn supported_locales() -> Vec<String> {
    Locale::ALL
        .iter()
        .map(|locale| locale.as_str().to_string())
        .collect()
}

/// Switches UI language (`ru` or `en`) and persists the choice.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_set_locale(locale: String) -> NotesViewState {
    let Some(locale) = Locale::parse(&locale) else {
        return NotesViewState::failure(format!("unsupported locale `{locale}`"));
    };
    with_session(|app| {
        if let Err(err) = app.set_locale(locale) {
            error!("event=locale_save module=ffi status=error error={err}");
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_dismiss_notice() -> NotesViewState {
    with_session(|app| app.dismiss_notice())
}

fn start_session(config: &CoreConfig) -> Result<Session, String> {
    config.ensure_dirs().map_err(|err| err.to_string())?;

    match import_legacy(config) {
        Ok(ImportOutcome::Imported(report)) => info!(
            "event=session_init module=ffi status=legacy_imported imported={} encrypted={}",
            report.imported, report.encrypted
        ),
        Ok(_) => {}
        Err(err) => warn!("event=session_init module=ffi status=legacy_import_failed error={err}"),
    }

    let settings_conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let i18n = I18n::load(Box::new(SqliteSettingsStore::new(settings_conn)));
    let client = DbStoreClient::new(config.db_path.clone(), Argon2ChaCha::default());
    let mut app = NotesApp::new(client, i18n);
    app.refresh();
    info!(
        "event=session_init module=ffi status=ok notes={}",
        app.notes().len()
    );
    Ok(app)
}

fn import_legacy(config: &CoreConfig) -> Result<ImportOutcome, String> {
    let mut conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let repo = SqliteNoteRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
    let mut service = NoteService::new(repo, Argon2ChaCha::default());
    import_legacy_notes(&mut service, &config.legacy_json_path()).map_err(|err| err.to_string())
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_session(f: impl FnOnce(&mut Session)) -> NotesViewState {
    let mut guard = lock_session();
    match guard.as_mut() {
        Some(app) => {
            f(app);
            snapshot(app)
        }
        None => NotesViewState::failure("notes session is not initialized; call notes_init"),
    }
}

fn with_note_id(raw: &str, f: impl FnOnce(&mut Session, NoteId)) -> NotesViewState {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => with_session(|app| f(app, id)),
        Err(_) => NotesViewState::failure(format!("invalid note id `{raw}`")),
    }
}

fn parse_encryption_filter(raw: &str) -> Option<EncryptionFilter> {
    match raw.trim() {
        "all" => Some(EncryptionFilter::All),
        "encrypted" => Some(EncryptionFilter::Encrypted),
        "unencrypted" => Some(EncryptionFilter::Unencrypted),
        _ => None,
    }
}

fn encryption_filter_label(filter: EncryptionFilter) -> &'static str {
    match filter {
        EncryptionFilter::All => "all",
        EncryptionFilter::Encrypted => "encrypted",
        EncryptionFilter::Unencrypted => "unencrypted",
    }
}

fn snapshot(app: &Session) -> NotesViewState {
    let i18n = app.i18n();
    let notes = app
        .list_items()
        .into_iter()
        .map(|item| NoteRowView {
            id: item.id.to_string(),
            encrypted: item.encrypted,
            title: item.title,
            preview: item.preview,
            tags: item.tags,
            updated_label: item.updated_label,
        })
        .collect();
    let editor = app.editor().map(|editor| EditorView {
        note_id: editor.note_id().map(|id| id.to_string()),
        title: editor.title().to_string(),
        content: editor.content().to_string(),
        tags: editor.tags().to_vec(),
        encrypt_intent: editor.encrypt_intent(),
        can_toggle_encrypt: editor.can_toggle_encrypt(),
    });
    let prompt = app.controller().prompt().map(|prompt| PromptView {
        mode: match prompt.mode() {
            PromptMode::Create => "create",
            PromptMode::Unlock => "unlock",
        }
        .to_string(),
        error: prompt
            .error()
            .map(|err| i18n.t(err.message_key()).to_string()),
    });

    NotesViewState {
        locale: i18n.locale().as_str().to_string(),
        notes,
        available_tags: app.available_tags(),
        selected_tags: app.filter().selected_tags().map(str::to_string).collect(),
        tag_search: app.filter().tag_search().to_string(),
        encryption_filter: encryption_filter_label(app.filter().encryption).to_string(),
        editor,
        prompt,
        notice: app
            .notice()
            .map(|notice| i18n.t(notice.message_key()).to_string()),
        busy: app.controller().unlock_in_flight() || app.controller().save_in_flight(),
        error: String::new(),
    }
}
