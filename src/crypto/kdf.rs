//! Calm Code derivation: PIN validation, verification digest, and the
//! PBKDF2-HMAC-SHA256 encryption key.
//!
//! Two independent values come out of a PIN:
//! - a SHA-256 **verification hash** (hex) that is persisted and used only
//!   to check a submitted code, and
//! - a 256-bit **session key** stretched with PBKDF2 (100 000 rounds)
//!   that never touches disk.
//!
//! Both are deterministic, so re-entering the code after a restart
//! reproduces the same key without storing it anywhere.

use std::fmt::Write;

use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::keys::{SessionKey, KEY_LEN};
use crate::errors::{JournalError, Result};

/// Number of digits in a Calm Code.
pub const PIN_LEN: usize = 4;

/// PBKDF2 round count.
pub const KDF_ITERATIONS: u32 = 100_000;

/// Application-wide PBKDF2 salt.
///
/// Kept identical to the browser journal so encrypted backups made there
/// can still be imported.
pub const APP_SALT: &[u8] = b"dailywins-journal-salt";

/// Check that `pin` is exactly [`PIN_LEN`] ASCII digits.
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() != PIN_LEN || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(JournalError::InvalidPin(PIN_LEN));
    }
    Ok(())
}

/// SHA-256 of the PIN as a lowercase hex string.
pub fn hash_pin(pin: &str) -> String {
    let digest = Sha256::digest(pin.as_bytes());
    digest
        .iter()
        .fold(String::with_capacity(digest.len() * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

/// Compare `hash_pin(pin)` with a stored verification hash.
///
/// Exact match over the full digest; never a prefix match.
pub fn verify_pin(pin: &str, expected_hash: &str) -> bool {
    let actual = hash_pin(pin);
    actual.len() == expected_hash.len()
        && bool::from(actual.as_bytes().ct_eq(expected_hash.as_bytes()))
}

/// Stretch a PIN into a 256-bit AES key.
pub fn derive_key(pin: &str) -> SessionKey {
    let mut bytes = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), APP_SALT, KDF_ITERATIONS, &mut bytes);
    let key = SessionKey::new(bytes);
    bytes.zeroize();
    key
}
