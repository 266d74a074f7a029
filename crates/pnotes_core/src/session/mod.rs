//! Interactive notes session: selection, unlock, editing and save routing.
//!
//! # Responsibility
//! - Hold all in-memory session state; nothing here is persisted.
//! - Talk to storage only through `NoteStoreClient`.

pub mod app;
pub mod controller;
pub mod editor;
pub mod prompt;
pub mod save;
