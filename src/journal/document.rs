//! The on-disk journal document and foreign import payloads.
//!
//! A journal file is one JSON document:
//!
//! ```text
//! {
//!   "entries": [ { "id", "text", "note", "encrypted", "date", "tag", "emoji" }, ... ],
//!   "tags":    [ "..." ],
//!   "privacy": { "isLocked", "verificationHash", "autoLockEnabled", "autoLockMinutes" },
//!   "exportReadable": true,
//!   "exportedAt": "...",   // backups only
//!   "encrypted": true,     // encrypted backups only
//!   "note": "..."          // encrypted backups only
//! }
//! ```
//!
//! Writes go through a temp file in the same directory followed by a
//! rename, so readers never see a half-written journal.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::Entry;
use crate::errors::{JournalError, Result};
use crate::vault::VaultConfig;

/// Note embedded in encrypted backups.
pub const ENCRYPTED_BACKUP_NOTE: &str =
    "This backup contains encrypted entries. You will need your original Calm Code to decrypt them.";

fn default_true() -> bool {
    true
}

/// The full persisted journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDocument {
    #[serde(default)]
    pub entries: Vec<Entry>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub privacy: VaultConfig,

    #[serde(default = "default_true")]
    pub export_readable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub encrypted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Default for JournalDocument {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            tags: Vec::new(),
            privacy: VaultConfig::default(),
            export_readable: true,
            exported_at: None,
            encrypted: false,
            note: None,
        }
    }
}

impl JournalDocument {
    /// Turn a stored journal into a backup: stamp the export time and,
    /// when protected, flag it as an encrypted backup.
    pub fn into_backup(mut self, exported_at: DateTime<Utc>) -> Self {
        self.exported_at = Some(exported_at);
        if self.privacy.is_locked() {
            self.encrypted = true;
            self.note = Some(ENCRYPTED_BACKUP_NOTE.to_string());
        }
        self
    }
}

/// Parse a journal document from JSON text.
pub fn parse_document(json: &str) -> Result<JournalDocument> {
    serde_json::from_str(json).map_err(|e| JournalError::InvalidJournal(format!("JSON: {e}")))
}

/// Read a journal document from disk.
pub fn read_document(path: &Path) -> Result<JournalDocument> {
    if !path.exists() {
        return Err(JournalError::JournalNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    parse_document(&content)
}

/// Write a journal document to disk **atomically**.
pub fn write_document(path: &Path, doc: &JournalDocument) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(doc)
        .map_err(|e| JournalError::SerializationError(format!("journal: {e}")))?;
    write_private(path, &bytes)
}

/// Atomically replace `path` with `bytes`, owner-only on Unix.
///
/// Used for anything that may hold plaintext entries: journals while
/// unprotected, and readable exports.
pub fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Foreign journal data handed to the import flow.
#[derive(Debug, Clone)]
pub struct ImportPayload {
    pub entries: Vec<Entry>,
    pub tags: Vec<String>,
    /// The foreign verification hash, when the source journal was protected.
    pub verification_hash: Option<String>,
}

impl ImportPayload {
    /// Build a payload from a parsed document, rejecting encrypted entries
    /// that could never be decrypted.
    pub fn from_document(doc: JournalDocument) -> Result<Self> {
        let verification_hash = doc.privacy.verification_hash().map(str::to_string);
        let payload = Self {
            entries: doc.entries,
            tags: doc.tags,
            verification_hash,
        };
        if payload.has_encrypted_entries() && payload.verification_hash.is_none() {
            return Err(JournalError::InvalidImport(
                "entries are encrypted but the file carries no verification hash".into(),
            ));
        }
        Ok(payload)
    }

    /// Parse a payload from JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| JournalError::InvalidImport(format!("not valid JSON: {e}")))?;
        if !value.get("entries").is_some_and(serde_json::Value::is_array) {
            return Err(JournalError::InvalidImport(
                "missing `entries` array".into(),
            ));
        }
        let doc: JournalDocument = serde_json::from_value(value)
            .map_err(|e| JournalError::InvalidImport(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Whether any entry still carries ciphertext.
    pub fn has_encrypted_entries(&self) -> bool {
        self.entries.iter().any(|e| e.encrypted)
    }

    /// Whether the PIN handshake is required before merging.
    pub fn needs_pin(&self) -> bool {
        self.verification_hash.is_some() && self.has_encrypted_entries()
    }
}
