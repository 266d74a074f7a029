//! Note store use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and crypto calls into note store operations.
//! - Keep session/UI layers decoupled from storage and cipher details.

pub mod legacy_import;
pub mod note_service;
