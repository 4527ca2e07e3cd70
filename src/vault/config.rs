//! Persisted lock configuration (the `privacy` block of the journal file).

use serde::{Deserialize, Serialize};

use crate::errors::{JournalError, Result};

/// Default auto-lock delay in minutes.
pub const DEFAULT_AUTO_LOCK_MINUTES: u32 = 5;

fn default_auto_lock_minutes() -> u32 {
    DEFAULT_AUTO_LOCK_MINUTES
}

/// Lock configuration.
///
/// `verification_hash` is present iff `is_locked`. Only the vault state
/// mutates this; everything else gets a shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultConfig {
    #[serde(default)]
    is_locked: bool,

    /// SHA-256 hex of the Calm Code. Older browser exports call it `pinHash`.
    #[serde(default, alias = "pinHash")]
    verification_hash: Option<String>,

    #[serde(default)]
    auto_lock_enabled: bool,

    #[serde(default = "default_auto_lock_minutes")]
    auto_lock_minutes: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            is_locked: false,
            verification_hash: None,
            auto_lock_enabled: false,
            auto_lock_minutes: DEFAULT_AUTO_LOCK_MINUTES,
        }
    }
}

impl VaultConfig {
    /// An unprotected config with a custom auto-lock delay.
    pub fn with_auto_lock_minutes(minutes: u32) -> Result<Self> {
        validate_minutes(minutes)?;
        Ok(Self {
            auto_lock_minutes: minutes,
            ..Self::default()
        })
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn verification_hash(&self) -> Option<&str> {
        self.verification_hash.as_deref()
    }

    pub fn auto_lock_enabled(&self) -> bool {
        self.auto_lock_enabled
    }

    pub fn auto_lock_minutes(&self) -> u32 {
        self.auto_lock_minutes
    }

    /// Reject configs that break the `is_locked` / hash pairing.
    pub fn validate(&self) -> Result<()> {
        match (self.is_locked, &self.verification_hash) {
            (true, None) => Err(JournalError::InvalidJournal(
                "journal is marked protected but has no verification hash".into(),
            )),
            (false, Some(_)) => Err(JournalError::InvalidJournal(
                "journal has a verification hash but is not marked protected".into(),
            )),
            _ => validate_minutes(self.auto_lock_minutes)
                .map_err(|e| JournalError::InvalidJournal(e.to_string())),
        }
    }

    pub(crate) fn protected(&self, verification_hash: String) -> Self {
        Self {
            is_locked: true,
            verification_hash: Some(verification_hash),
            ..self.clone()
        }
    }

    pub(crate) fn unprotected(&self) -> Self {
        Self {
            is_locked: false,
            verification_hash: None,
            auto_lock_enabled: false,
            auto_lock_minutes: self.auto_lock_minutes,
        }
    }

    pub(crate) fn with_auto_lock(&self, enabled: bool, minutes: Option<u32>) -> Result<Self> {
        let minutes = minutes.unwrap_or(self.auto_lock_minutes);
        validate_minutes(minutes)?;
        Ok(Self {
            auto_lock_enabled: enabled,
            auto_lock_minutes: minutes,
            ..self.clone()
        })
    }
}

fn validate_minutes(minutes: u32) -> Result<()> {
    if minutes == 0 {
        return Err(JournalError::ConfigError(
            "auto-lock delay must be at least 1 minute".into(),
        ));
    }
    Ok(())
}
