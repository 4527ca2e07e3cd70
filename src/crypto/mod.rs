//! Cryptographic primitives for CalmJournal.
//!
//! This module provides:
//! - Calm Code validation, SHA-256 verification hash, and PBKDF2 key
//!   stretching (`kdf`)
//! - The zeroizing in-memory `SessionKey` (`keys`)
//! - AES-256-GCM field encryption and decryption (`encryption`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, decrypt_field, encrypt, encrypt_field, CipherEnvelope};
pub use kdf::{derive_key, hash_pin, validate_pin, verify_pin, PIN_LEN};
pub use keys::SessionKey;
