//! Password-based encryption contract for note title/content.
//!
//! # Responsibility
//! - Define the `CryptoService` seam consumed by the note service.
//! - Ship one implementation (`Argon2ChaCha`) for production use.
//!
//! # Invariants
//! - A password either yields the one true plaintext or fails.
//! - Callers cannot distinguish a wrong password from corrupted ciphertext.

use crate::model::note::Password;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod argon2_chacha;
mod legacy_gcm;

pub use argon2_chacha::{Argon2ChaCha, KdfParams};

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Encrypts and decrypts UTF-8 text with a user password.
pub trait CryptoService {
    /// Encrypts `plaintext`, returning a self-describing ASCII envelope.
    fn encrypt(&self, plaintext: &str, password: &Password) -> CryptoResult<String>;
    /// Decrypts an envelope produced by `encrypt` with the same password.
    /// Implementations may also accept envelopes of earlier formats.
    fn decrypt(&self, envelope: &str, password: &Password) -> CryptoResult<String>;
}

#[derive(Debug)]
pub enum CryptoError {
    EmptyPassword,
    KeyDerivation(String),
    Encryption,
    /// Authentication failed: wrong password or tampered data.
    Decryption,
    InvalidFormat(&'static str),
    UnsupportedVersion(u8),
    Base64(base64::DecodeError),
}

impl Display for CryptoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password cannot be empty"),
            Self::KeyDerivation(details) => write!(f, "key derivation failed: {details}"),
            Self::Encryption => write!(f, "encryption failed"),
            Self::Decryption => write!(f, "decryption failed: wrong password or corrupted data"),
            Self::InvalidFormat(details) => write!(f, "invalid encrypted envelope: {details}"),
            Self::UnsupportedVersion(version) => {
                write!(f, "unsupported envelope version {version}")
            }
            Self::Base64(err) => write!(f, "invalid base64 envelope: {err}"),
        }
    }
}

impl Error for CryptoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Base64(err) => Some(err),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Base64(value)
    }
}
