//! Domain model for notes and their protection state.
//!
//! # Responsibility
//! - Define the note record returned by the Note Store.
//! - Make plaintext access explicit through a tagged body type.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` assigned at creation.
//! - Locked bodies never expose their ciphertext as plaintext.

pub mod note;
