//! Password prompt contract.
//!
//! # Responsibility
//! - Hold the two password fields and the inline error of one open prompt.
//! - Validate input locally before any external call is made.
//!
//! # Invariants
//! - A prompt always opens with empty fields and no error.
//! - `submit` yields a password only after validation passes.
//! - Field contents are wiped when the prompt is dropped.

use crate::model::note::Password;
use std::fmt::{Debug, Formatter};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Which flow opened the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Choosing a password for an encrypted save; requires confirmation.
    Create,
    /// Unlocking the selected encrypted note.
    Unlock,
}

/// Inline error shown by the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptError {
    /// Password (or confirmation) is blank.
    Required,
    /// Password is shorter than `MIN_PASSWORD_CHARS`.
    TooShort,
    /// Confirmation differs from the password.
    Mismatch,
    /// Unlock failed; fed back by the controller.
    IncorrectPassword,
}

impl PromptError {
    /// Translation key for the message shown to the user.
    pub fn message_key(self) -> &'static str {
        match self {
            Self::Required => "password.required",
            Self::TooShort => "password.minLength",
            Self::Mismatch => "password.mismatch",
            Self::IncorrectPassword => "password.error",
        }
    }
}

/// One open password prompt.
#[derive(Clone)]
pub struct PasswordPrompt {
    mode: PromptMode,
    password: Password,
    confirmation: Password,
    error: Option<PromptError>,
}

impl PasswordPrompt {
    /// Opens a prompt with cleared fields and no error.
    pub fn open(mode: PromptMode) -> Self {
        Self {
            mode,
            password: Password::new(""),
            confirmation: Password::new(""),
            error: None,
        }
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn error(&self) -> Option<PromptError> {
        self.error
    }

    pub fn set_password(&mut self, value: &str) {
        self.password = Password::new(value);
    }

    /// Ignored outside `Create` mode, where no confirmation field exists.
    pub fn set_confirmation(&mut self, value: &str) {
        if self.mode == PromptMode::Create {
            self.confirmation = Password::new(value);
        }
    }

    /// Displays an error produced by the caller's external call.
    pub fn set_error(&mut self, error: PromptError) {
        self.error = Some(error);
    }

    /// Validates the fields and returns the password to hand to the caller.
    ///
    /// On failure the error is stored for display and also returned.
    pub fn submit(&mut self) -> Result<Password, PromptError> {
        self.error = None;
        match validate(self.mode, self.password.expose(), self.confirmation.expose()) {
            Ok(()) => Ok(self.password.clone()),
            Err(err) => {
                self.error = Some(err);
                Err(err)
            }
        }
    }
}

impl Debug for PasswordPrompt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordPrompt")
            .field("mode", &self.mode)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Local validation rules, checked in order.
pub fn validate(mode: PromptMode, password: &str, confirmation: &str) -> Result<(), PromptError> {
    if password.trim().is_empty() {
        return Err(PromptError::Required);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(PromptError::TooShort);
    }
    if mode == PromptMode::Create {
        if confirmation.trim().is_empty() {
            return Err(PromptError::Required);
        }
        if password != confirmation {
            return Err(PromptError::Mismatch);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate, PasswordPrompt, PromptError, PromptMode};

    #[test]
    fn validation_order_matches_prompt_contract() {
        use PromptMode::{Create, Unlock};
        assert_eq!(validate(Unlock, "   ", ""), Err(PromptError::Required));
        assert_eq!(validate(Unlock, "abc", ""), Err(PromptError::TooShort));
        assert_eq!(validate(Unlock, "abcdef", ""), Ok(()));
        assert_eq!(validate(Create, "abcdef", " "), Err(PromptError::Required));
        assert_eq!(validate(Create, "abcdef", "abcdeg"), Err(PromptError::Mismatch));
        assert_eq!(validate(Create, "abcdef", "abcdef"), Ok(()));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(validate(PromptMode::Unlock, "пароль", ""), Ok(()));
        assert_eq!(
            validate(PromptMode::Unlock, "ключ", ""),
            Err(PromptError::TooShort)
        );
    }

    #[test]
    fn submit_stores_error_and_clears_it_on_next_attempt() {
        let mut prompt = PasswordPrompt::open(PromptMode::Unlock);
        prompt.set_password("abc");
        assert_eq!(prompt.submit().unwrap_err(), PromptError::TooShort);
        assert_eq!(prompt.error(), Some(PromptError::TooShort));

        prompt.set_password("abcdefgh");
        let password = prompt.submit().unwrap();
        assert_eq!(password.expose(), "abcdefgh");
        assert_eq!(prompt.error(), None);
    }

    #[test]
    fn unlock_mode_ignores_confirmation_field() {
        let mut prompt = PasswordPrompt::open(PromptMode::Unlock);
        prompt.set_password("abcdefgh");
        prompt.set_confirmation("different");
        assert!(prompt.submit().is_ok());
    }

    #[test]
    fn debug_output_omits_fields() {
        let mut prompt = PasswordPrompt::open(PromptMode::Create);
        prompt.set_password("topsecret");
        assert!(!format!("{prompt:?}").contains("topsecret"));
    }
}
