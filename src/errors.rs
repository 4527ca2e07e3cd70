use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in CalmJournal.
#[derive(Debug, Error)]
pub enum JournalError {
    // --- PIN / authentication errors ---
    #[error("Invalid code — the Calm Code must be exactly {0} digits")]
    InvalidPin(usize),

    #[error("Incorrect code")]
    AuthenticationFailed,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong code or corrupted data")]
    DecryptionFailed,

    #[error("Could not process {failed} of {total} entries — nothing was changed")]
    BulkOperationFailed { failed: usize, total: usize },

    // --- Lock state errors ---
    #[error("Journal is locked — enter your Calm Code first")]
    NotUnlocked,

    #[error("Journal is already protected by a Calm Code")]
    ProtectionAlreadyEnabled,

    #[error("Journal is not protected by a Calm Code")]
    ProtectionNotEnabled,

    #[error("No encrypted import is waiting for a code")]
    NoPendingImport,

    #[error("Invalid import: {0}")]
    InvalidImport(String),

    #[error("Entry {0} already exists")]
    DuplicateEntry(i64),

    // --- Journal file errors ---
    #[error("Journal not found at {0}")]
    JournalNotFound(PathBuf),

    #[error("Invalid journal file: {0}")]
    InvalidJournal(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Audit error: {0}")]
    AuditError(String),
}

impl JournalError {
    /// Returns `true` for failures the user recovers from by simply
    /// re-entering a code (wrong PIN, malformed PIN, undecryptable data).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidPin(_)
                | Self::AuthenticationFailed
                | Self::DecryptionFailed
        )
    }
}

/// Convenience type alias for CalmJournal results.
pub type Result<T> = std::result::Result<T, JournalError>;
