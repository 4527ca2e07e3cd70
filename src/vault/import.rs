//! Holding area for a foreign encrypted journal awaiting its code.

use crate::crypto::{derive_key, validate_pin, verify_pin};
use crate::errors::{JournalError, Result};
use crate::journal::entry::Entry;
use crate::journal::ImportPayload;

use super::state::decrypt_entries;

/// A foreign journal waiting for the code it was protected with.
///
/// Discarded after a successful merge or an explicit cancel. A wrong code
/// leaves it in place so the user can try again.
#[derive(Debug)]
pub struct PendingImport {
    entries: Vec<Entry>,
    tags: Vec<String>,
    verification_hash: String,
}

impl PendingImport {
    /// Hold a protected payload. Payloads that need no code are rejected.
    pub fn new(payload: ImportPayload) -> Result<Self> {
        let verification_hash = match payload.verification_hash {
            Some(hash) if payload.entries.iter().any(|e| e.encrypted) => hash,
            _ => {
                return Err(JournalError::InvalidImport(
                    "payload is not encrypted — import it directly".into(),
                ))
            }
        };
        Ok(Self {
            entries: payload.entries,
            tags: payload.tags,
            verification_hash,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Check `pin` against the *foreign* hash and decrypt every entry.
    ///
    /// Any entry that fails to decrypt aborts the whole import with
    /// `AuthenticationFailed`.
    pub fn decrypt(&self, pin: &str) -> Result<Vec<Entry>> {
        validate_pin(pin)?;
        if !verify_pin(pin, &self.verification_hash) {
            return Err(JournalError::AuthenticationFailed);
        }
        let key = derive_key(pin);
        decrypt_entries(&self.entries, &key).map_err(|_| JournalError::AuthenticationFailed)
    }
}
