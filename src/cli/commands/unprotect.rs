//! `calmjournal unprotect` — remove the Calm Code and decrypt every entry.

use crate::cli::{open_journal, unlock_if_needed, Cli};
use crate::errors::{JournalError, Result};
use crate::vault::LockState;

/// Execute the `unprotect` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut journal = open_journal(cli)?;
    let controller = &mut journal.controller;

    if controller.state() == LockState::Unprotected {
        return Err(JournalError::ProtectionNotEnabled);
    }

    unlock_if_needed(controller, &journal.audit)?;
    controller.disable_protection()?;

    let count = controller.vault().entries().len();
    journal
        .audit
        .record("unprotect", Some(&format!("{count} entries decrypted")));

    Ok(())
}
