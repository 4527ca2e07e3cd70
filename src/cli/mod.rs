//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::validate_pin;
use crate::errors::{JournalError, Result};
use crate::journal::{JsonFileStore, Persistence};
use crate::vault::{LockController, LockState, VaultConfig, VaultState};

/// Env var holding the Calm Code for non-interactive use.
pub const PIN_ENV: &str = "CALMJOURNAL_PIN";

/// Env var holding the replacement code for `protect` and `change-code`.
pub const NEW_PIN_ENV: &str = "CALMJOURNAL_NEW_PIN";

/// Env var holding the code of an encrypted backup being imported.
pub const IMPORT_PIN_ENV: &str = "CALMJOURNAL_IMPORT_PIN";

/// CalmJournal CLI: a daily wins journal with an optional Calm Code lock.
#[derive(Parser)]
#[command(
    name = "calmjournal",
    about = "Daily wins journal with Calm Code privacy lock",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Journal file (default: journal_file from .calmjournal.toml, or journal.json)
    #[arg(short, long, global = true)]
    pub file: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Show whether the journal is protected and how many entries it holds
    Status,

    /// Record a new win
    Add {
        /// What went well
        text: String,
        /// Optional longer note
        #[arg(short, long)]
        note: Option<String>,
        /// Optional tag (e.g. work, health)
        #[arg(short, long)]
        tag: Option<String>,
        /// Optional mood emoji
        #[arg(short, long)]
        emoji: Option<String>,
    },

    /// List all entries, newest first
    List,

    /// Set a Calm Code and encrypt every entry
    Protect,

    /// Remove the Calm Code and decrypt every entry
    Unprotect,

    /// Change the Calm Code, re-encrypting every entry
    ChangeCode,

    /// Turn the auto-lock on or off
    Autolock {
        /// on or off
        #[arg(value_enum)]
        mode: Toggle,
        /// Minutes of inactivity before locking
        #[arg(short, long)]
        minutes: Option<u32>,
    },

    /// Export a JSON backup (plus a readable text copy)
    Export {
        /// Output file path (default: calmjournal-backup-<timestamp>.json)
        #[arg(short, long)]
        output: Option<String>,
        /// Skip the readable .txt copy
        #[arg(long)]
        no_readable: bool,
    },

    /// Import entries from a JSON backup (plain or encrypted)
    Import {
        /// Path to the backup file
        file: String,
    },

    /// Forgot your code: write an encrypted backup, then start a fresh journal
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Interactive session with auto-lock
    Session,

    /// View the audit log of lock events
    #[cfg(feature = "audit-log")]
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Show version
    Version,
}

/// On/off switch for `autolock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Read a code from `var`, if set and non-empty.
///
/// Returns `Zeroizing<String>` so the code is wiped from memory on drop.
pub fn pin_from_env(var: &str) -> Option<Zeroizing<String>> {
    match std::env::var(var) {
        Ok(pin) if !pin.is_empty() => Some(Zeroizing::new(pin)),
        _ => None,
    }
}

/// Get a Calm Code, trying in order:
/// 1. the `var` env var (CI/CD, tests)
/// 2. Interactive prompt
pub fn prompt_pin(var: &str, prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(pin) = pin_from_env(var) {
        return Ok(pin);
    }

    let pin = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| JournalError::CommandFailed(format!("code prompt: {e}")))?;
    Ok(Zeroizing::new(pin))
}

/// Prompt for a new Calm Code with confirmation.
///
/// Also respects `var` for scripted usage. Codes from the environment are
/// validated but never re-prompted.
pub fn prompt_new_pin(var: &str) -> Result<Zeroizing<String>> {
    if let Some(pin) = pin_from_env(var) {
        validate_pin(&pin)?;
        return Ok(pin);
    }

    loop {
        let pin = dialoguer::Password::new()
            .with_prompt("Choose a 4-digit Calm Code")
            .with_confirmation("Confirm Calm Code", "Codes do not match, try again")
            .interact()
            .map_err(|e| JournalError::CommandFailed(format!("code prompt: {e}")))?;
        let pin = Zeroizing::new(pin);

        if let Err(e) = validate_pin(&pin) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(pin);
    }
}

/// Working directory plus the settings loaded from it.
pub fn load_settings() -> Result<(PathBuf, Settings)> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    Ok((cwd, settings))
}

/// Build the full path to the journal file from the CLI arguments.
pub fn journal_path(cli: &Cli, settings: &Settings, cwd: &Path) -> PathBuf {
    settings.journal_path(cwd, cli.file.as_deref())
}

/// An opened journal: the lock controller plus where its events go.
pub struct Journal {
    pub controller: LockController<JsonFileStore>,
    pub settings: Settings,
    pub audit: AuditSink,
}

/// Open the journal named by the CLI arguments.
///
/// A missing file starts an empty, unprotected journal seeded with the
/// configured auto-lock delay. Nothing is written until the first change.
pub fn open_journal(cli: &Cli) -> Result<Journal> {
    let (cwd, settings) = load_settings()?;
    let path = journal_path(cli, &settings, &cwd);
    let is_new = !path.exists();

    let (mut store, doc) = JsonFileStore::open_or_default(&path)?;
    let config = if is_new {
        store.set_export_readable(settings.export_readable);
        VaultConfig::with_auto_lock_minutes(settings.auto_lock_minutes)?
    } else {
        doc.privacy
    };

    let vault = VaultState::restore(config, doc.entries)?;
    let controller =
        LockController::new(vault, store).with_notifier(Box::new(output::CliNotifier));
    let audit = AuditSink::for_journal(&settings, &path);

    Ok(Journal {
        controller,
        settings,
        audit,
    })
}

/// Prompt for the code and unlock, if the journal is locked at rest.
///
/// Unprotected and already-unlocked journals pass straight through.
pub fn unlock_if_needed<S: Persistence>(
    controller: &mut LockController<S>,
    audit: &AuditSink,
) -> Result<()> {
    if controller.state() != LockState::LockedAtRest {
        return Ok(());
    }
    let pin = prompt_pin(PIN_ENV, "Enter your Calm Code")?;
    unlock_with(controller, audit, &pin)
}

/// Unlock with a known code, recording the outcome in the audit log.
pub fn unlock_with<S: Persistence>(
    controller: &mut LockController<S>,
    audit: &AuditSink,
    pin: &str,
) -> Result<()> {
    match controller.unlock(pin) {
        Ok(()) => {
            audit.record("unlock", None);
            Ok(())
        }
        Err(e) => {
            if e.is_recoverable() {
                audit.record("unlock-failed", None);
            }
            Err(e)
        }
    }
}

/// Where audit events for one journal go. Never fails.
#[derive(Debug, Clone)]
pub struct AuditSink {
    path: Option<PathBuf>,
}

impl AuditSink {
    /// Log next to `journal_path`, unless the settings turn auditing off.
    pub fn for_journal(settings: &Settings, journal_path: &Path) -> Self {
        let enabled = settings.audit_log && cfg!(feature = "audit-log");
        Self {
            path: enabled.then(|| journal_path.to_path_buf()),
        }
    }

    /// A sink that drops every event.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn record(&self, op: &str, details: Option<&str>) {
        #[cfg(feature = "audit-log")]
        if let Some(path) = &self.path {
            crate::audit::log_event(path, op, details);
        }

        #[cfg(not(feature = "audit-log"))]
        let _ = (op, details);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_options() {
        let cli = Cli::try_parse_from([
            "calmjournal",
            "add",
            "Went for a walk",
            "--tag",
            "health",
            "--note",
            "Sunny",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                text, tag, note, emoji,
            } => {
                assert_eq!(text, "Went for a walk");
                assert_eq!(tag.as_deref(), Some("health"));
                assert_eq!(note.as_deref(), Some("Sunny"));
                assert!(emoji.is_none());
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn parses_autolock_toggle() {
        let cli = Cli::try_parse_from(["calmjournal", "autolock", "on", "--minutes", "10"]).unwrap();
        match cli.command {
            Commands::Autolock { mode, minutes } => {
                assert!(mode.enabled());
                assert_eq!(minutes, Some(10));
            }
            _ => panic!("expected autolock"),
        }
    }

    #[test]
    fn global_file_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["calmjournal", "status", "--file", "wins.json"]).unwrap();
        assert_eq!(cli.file.as_deref(), Some("wins.json"));
    }

    #[test]
    fn disabled_sink_records_nothing() {
        let sink = AuditSink::disabled();
        assert!(!sink.is_enabled());
        sink.record("lock", None);
    }

    #[test]
    fn sink_respects_settings() {
        let settings = Settings {
            audit_log: false,
            ..Settings::default()
        };
        let sink = AuditSink::for_journal(&settings, Path::new("journal.json"));
        assert!(!sink.is_enabled());
    }
}
