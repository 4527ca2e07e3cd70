//! `calmjournal reset` — the "forgot my code" escape hatch.
//!
//! Writes the journal as-is to an encrypted backup (recoverable later with
//! the old code via `import`), then replaces the local journal with a
//! fresh, unprotected one. No code is needed.

use chrono::Utc;
use dialoguer::Confirm;

use crate::cli::commands::export::default_backup_name;
use crate::cli::output;
use crate::cli::{journal_path, load_settings, AuditSink, Cli};
use crate::errors::{JournalError, Result};
use crate::journal::document::write_document;
use crate::journal::{JournalDocument, JsonFileStore};
use crate::vault::VaultConfig;

/// Execute the `reset` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let (cwd, settings) = load_settings()?;
    let path = journal_path(cli, &settings, &cwd);
    let audit = AuditSink::for_journal(&settings, &path);

    let (store, doc) = JsonFileStore::open(&path)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Back up and wipe {}? This starts a fresh journal",
                path.display()
            ))
            .default(false)
            .interact()
            .map_err(|e| {
                JournalError::CommandFailed(format!("failed to read confirmation: {e}"))
            })?;

        if !confirmed {
            return Err(JournalError::UserCancelled);
        }
    }

    // 1. Back up whatever is stored, encrypted entries stay encrypted.
    let now = Utc::now();
    let backup_path = if doc.entries.is_empty() {
        output::info("No entries to back up.");
        None
    } else {
        let encrypted = doc.privacy.is_locked();
        let dest = cwd.join(default_backup_name(encrypted, now));
        let backup = store.document(&doc.privacy, &doc.entries).into_backup(now);
        write_document(&dest, &backup)?;
        output::success(&format!("Backup written to {}", dest.display()));
        Some(dest)
    };

    // 2. Start over.
    let fresh = JournalDocument {
        privacy: VaultConfig::with_auto_lock_minutes(settings.auto_lock_minutes)?,
        export_readable: doc.export_readable,
        ..JournalDocument::default()
    };
    write_document(&path, &fresh)?;

    let details = backup_path
        .is_some()
        .then(|| format!("{} entries backed up", doc.entries.len()));
    audit.record("reset", details.as_deref());

    output::success("Started a fresh journal.");
    if backup_path.is_some() {
        output::tip("Run `calmjournal import <backup>` with your old code to restore entries.");
    }

    Ok(())
}
