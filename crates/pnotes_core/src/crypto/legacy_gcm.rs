//! Reader for envelopes written by the pre-SQLite notes app.
//!
//! Layout (base64, standard alphabet): `salt[16] | nonce[12] | ciphertext+tag`.
//! Key = PBKDF2-HMAC-SHA256(password, salt, 100 000 rounds), cipher AES-256-GCM.
//! Read-only: new envelopes are always written by `Argon2ChaCha`.

use super::{CryptoError, CryptoResult};
use crate::model::note::Password;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const TAG_SIZE: usize = 16;
const PBKDF2_ROUNDS: u32 = 100_000;

/// Minimum decoded length of a legacy envelope.
pub(super) const MIN_LEN: usize = SALT_SIZE + NONCE_SIZE + TAG_SIZE;

pub(super) fn decrypt(data: &[u8], password: &Password) -> CryptoResult<String> {
    if data.len() < MIN_LEN {
        return Err(CryptoError::InvalidFormat("envelope too short"));
    }
    let (salt, rest) = data.split_at(SALT_SIZE);
    let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2_hmac::<Sha256>(
        password.expose().as_bytes(),
        salt,
        PBKDF2_ROUNDS,
        key.as_mut_slice(),
    );
    let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Decryption)?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decryption)?,
    );

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| CryptoError::InvalidFormat("plaintext is not valid UTF-8"))
}
