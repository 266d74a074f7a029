//! Argon2id key derivation + ChaCha20-Poly1305 envelope.
//!
//! Envelope layout (base64, standard alphabet):
//! `version u8 | m_cost u32 LE | t_cost u32 LE | p_cost u32 LE | salt[16] | nonce[12] | ciphertext+tag`
//!
//! KDF costs travel with each envelope; `decrypt` reads them from the header
//! and ignores the instance's configured costs. Data whose header does not
//! parse is handed to the legacy PBKDF2/AES-GCM reader.

use super::{legacy_gcm, CryptoError, CryptoResult, CryptoService};
use crate::model::note::Password;
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::RngCore;
use zeroize::Zeroizing;

const ENVELOPE_VERSION: u8 = 1;
const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const TAG_SIZE: usize = 16;
const PARAMS_SIZE: usize = 12;
const HEADER_SIZE: usize = 1 + PARAMS_SIZE + SALT_SIZE + NONCE_SIZE;
// Upper bounds accepted from an envelope header.
const MAX_MEMORY_KIB: u32 = 1 << 20;
const MAX_ITERATIONS: u32 = 64;
const MAX_PARALLELISM: u32 = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// OWASP-recommended Argon2id baseline (19 MiB, t=2, p=1).
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Production `CryptoService`.
#[derive(Debug, Clone, Default)]
pub struct Argon2ChaCha {
    params: KdfParams,
}

impl Argon2ChaCha {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }
}

impl CryptoService for Argon2ChaCha {
    fn encrypt(&self, plaintext: &str, password: &Password) -> CryptoResult<String> {
        if password.is_empty() {
            return Err(CryptoError::EmptyPassword);
        }

        let mut salt = [0u8; SALT_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        let mut rng = rand::thread_rng();
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut nonce);

        let key = derive_key(password, &salt, self.params)?;
        let cipher =
            ChaCha20Poly1305::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Encryption)?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CryptoError::Encryption)?;

        let mut envelope = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        envelope.push(ENVELOPE_VERSION);
        envelope.extend_from_slice(&self.params.memory_kib.to_le_bytes());
        envelope.extend_from_slice(&self.params.iterations.to_le_bytes());
        envelope.extend_from_slice(&self.params.parallelism.to_le_bytes());
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(envelope))
    }

    fn decrypt(&self, envelope: &str, password: &Password) -> CryptoResult<String> {
        if password.is_empty() {
            return Err(CryptoError::EmptyPassword);
        }

        let data = BASE64.decode(envelope.trim())?;
        let header = match parse_header(&data) {
            Ok(header) => header,
            Err(_) if data.len() >= legacy_gcm::MIN_LEN => {
                return legacy_gcm::decrypt(&data, password);
            }
            Err(err) => return Err(err),
        };

        let key = derive_key(password, header.salt, header.params)?;
        let cipher =
            ChaCha20Poly1305::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Decryption)?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(header.nonce), header.ciphertext)
                .map_err(|_| CryptoError::Decryption)?,
        );

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| CryptoError::InvalidFormat("plaintext is not valid UTF-8"))
    }
}

struct Header<'a> {
    params: KdfParams,
    salt: &'a [u8],
    nonce: &'a [u8],
    ciphertext: &'a [u8],
}

fn parse_header(data: &[u8]) -> CryptoResult<Header<'_>> {
    if data.len() < HEADER_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidFormat("envelope too short"));
    }
    if data[0] != ENVELOPE_VERSION {
        return Err(CryptoError::UnsupportedVersion(data[0]));
    }

    let params = KdfParams {
        memory_kib: read_u32(data, 1),
        iterations: read_u32(data, 5),
        parallelism: read_u32(data, 9),
    };
    if params.memory_kib > MAX_MEMORY_KIB {
        return Err(CryptoError::InvalidFormat("kdf memory cost out of range"));
    }
    if params.iterations == 0 || params.iterations > MAX_ITERATIONS {
        return Err(CryptoError::InvalidFormat("kdf iteration count out of range"));
    }
    if params.parallelism == 0 || params.parallelism > MAX_PARALLELISM {
        return Err(CryptoError::InvalidFormat("kdf parallelism out of range"));
    }

    let salt_start = 1 + PARAMS_SIZE;
    let nonce_start = salt_start + SALT_SIZE;
    Ok(Header {
        params,
        salt: &data[salt_start..nonce_start],
        nonce: &data[nonce_start..HEADER_SIZE],
        ciphertext: &data[HEADER_SIZE..],
    })
}

fn derive_key(
    password: &Password,
    salt: &[u8],
    params: KdfParams,
) -> CryptoResult<Zeroizing<[u8; KEY_SIZE]>> {
    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|err| CryptoError::KeyDerivation(err.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(password.expose().as_bytes(), salt, key.as_mut_slice())
        .map_err(|err| CryptoError::KeyDerivation(err.to_string()))?;
    Ok(key)
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}
