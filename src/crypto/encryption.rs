//! AES-256-GCM encryption of entry fields.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext, then base64-encodes the result so the
//! envelope can sit directly in an entry's `text` or `note` field.
//!
//! Layout of the decoded envelope:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::keys::SessionKey;
use crate::errors::{JournalError, Result};

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
const TAG_LEN: usize = 16;

/// Base64 of `nonce || ciphertext || tag`.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherEnvelope(String);

impl CipherEnvelope {
    /// The encoded envelope.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for CipherEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherEnvelope({} chars)", self.0.len())
    }
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(key: &SessionKey, plaintext: &str) -> Result<CipherEnvelope> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| JournalError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| JournalError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&nonce);
    combined.extend_from_slice(&ciphertext);
    Ok(CipherEnvelope(BASE64.encode(combined)))
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// A wrong key, a flipped byte, a truncated envelope or invalid base64 all
/// come back as [`JournalError::DecryptionFailed`].
pub fn decrypt(key: &SessionKey, envelope: &str) -> Result<String> {
    let combined = BASE64
        .decode(envelope.trim())
        .map_err(|_| JournalError::DecryptionFailed)?;

    if combined.len() < NONCE_LEN + TAG_LEN {
        return Err(JournalError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| JournalError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| JournalError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| JournalError::DecryptionFailed)
}

/// Encrypt an entry field. Blank fields stay blank.
pub fn encrypt_field(key: &SessionKey, value: &str) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    encrypt(key, value).map(CipherEnvelope::into_string)
}

/// Decrypt an entry field. Blank fields stay blank.
pub fn decrypt_field(key: &SessionKey, value: &str) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    decrypt(key, value)
}
