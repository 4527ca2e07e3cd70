use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{JournalError, Result};
use crate::vault::config::DEFAULT_AUTO_LOCK_MINUTES;

/// Project-level configuration, loaded from `.calmjournal.toml`.
///
/// Every field has a sensible default so CalmJournal works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Journal file, relative to the working directory unless absolute.
    #[serde(default = "default_journal_file")]
    pub journal_file: String,

    /// Auto-lock delay used when protection is first enabled.
    #[serde(default = "default_auto_lock_minutes")]
    pub auto_lock_minutes: u32,

    /// Also write a readable `.txt` next to JSON exports.
    #[serde(default = "default_true")]
    pub export_readable: bool,

    /// Record lock events in `audit.db` next to the journal.
    #[serde(default = "default_true")]
    pub audit_log: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_journal_file() -> String {
    "journal.json".to_string()
}

fn default_auto_lock_minutes() -> u32 {
    DEFAULT_AUTO_LOCK_MINUTES
}

fn default_true() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            journal_file: default_journal_file(),
            auto_lock_minutes: default_auto_lock_minutes(),
            export_readable: default_true(),
            audit_log: default_true(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = ".calmjournal.toml";

    /// Load settings from `<dir>/.calmjournal.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            JournalError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.auto_lock_minutes == 0 {
            return Err(JournalError::ConfigError(format!(
                "{}: auto_lock_minutes must be at least 1",
                config_path.display()
            )));
        }

        Ok(settings)
    }

    /// Resolve the journal path, preferring an explicit override.
    pub fn journal_path(&self, dir: &Path, override_path: Option<&str>) -> PathBuf {
        let file = override_path.unwrap_or(&self.journal_file);
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
