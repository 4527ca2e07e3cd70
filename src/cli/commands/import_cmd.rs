//! `calmjournal import` — merge entries from a JSON backup.
//!
//! Plain backups merge straight away. Encrypted backups wait for the code
//! they were protected with, which may differ from this journal's code.
//! Entries whose id already exists locally are skipped.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{open_journal, pin_from_env, prompt_pin, unlock_if_needed, Cli, IMPORT_PIN_ENV};
use crate::errors::{JournalError, Result};
use crate::journal::{ImportPayload, Persistence};
use crate::vault::{ImportStart, LockController};

/// Interactive attempts at an encrypted backup's code.
const MAX_ATTEMPTS: usize = 3;

/// Execute the `import` command.
pub fn execute(cli: &Cli, file_path: &str) -> Result<()> {
    let source = Path::new(file_path);

    if !source.exists() {
        return Err(JournalError::CommandFailed(format!(
            "import file not found: {}",
            source.display()
        )));
    }

    let content = fs::read_to_string(source)
        .map_err(|e| JournalError::CommandFailed(format!("failed to read file: {e}")))?;
    let payload = ImportPayload::parse(&content)?;

    let mut journal = open_journal(cli)?;
    let controller = &mut journal.controller;
    unlock_if_needed(controller, &journal.audit)?;

    let added = match controller.start_import(payload)? {
        ImportStart::Merged { added } => added,
        ImportStart::AwaitingPin { entry_count } => {
            output::info(&format!(
                "This backup holds {entry_count} encrypted entries."
            ));
            let attempts = if pin_from_env(IMPORT_PIN_ENV).is_some() {
                1
            } else {
                MAX_ATTEMPTS
            };
            submit_with_retries(controller, attempts)?
        }
    };

    journal.audit.record(
        "import",
        Some(&format!("{added} entries from {}", source.display())),
    );

    Ok(())
}

/// Ask for the backup's code until it works or attempts run out.
///
/// The pending import is dropped when giving up.
fn submit_with_retries<S: Persistence>(
    controller: &mut LockController<S>,
    attempts: usize,
) -> Result<usize> {
    let mut last_err = JournalError::NoPendingImport;
    for _ in 0..attempts {
        let pin = match prompt_pin(IMPORT_PIN_ENV, "Calm Code for this backup") {
            Ok(pin) => pin,
            Err(e) => {
                controller.cancel_import_decrypt();
                return Err(e);
            }
        };
        match controller.submit_import_pin(&pin) {
            Ok(added) => return Ok(added),
            Err(e) if e.is_recoverable() => last_err = e,
            Err(e) => {
                controller.cancel_import_decrypt();
                return Err(e);
            }
        }
    }
    controller.cancel_import_decrypt();
    Err(last_err)
}
