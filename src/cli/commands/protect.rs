//! `calmjournal protect` — set a Calm Code and encrypt every entry.

use crate::cli::output;
use crate::cli::{open_journal, prompt_new_pin, Cli, PIN_ENV};
use crate::errors::{JournalError, Result};
use crate::vault::LockState;

/// Execute the `protect` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut journal = open_journal(cli)?;
    let controller = &mut journal.controller;

    // Check before prompting so the user isn't asked for a code for nothing.
    if controller.state() != LockState::Unprotected {
        output::tip("Use `calmjournal change-code` to pick a different code.");
        return Err(JournalError::ProtectionAlreadyEnabled);
    }

    let pin = prompt_new_pin(PIN_ENV)?;
    controller.enable_protection(&pin)?;

    let count = controller.vault().entries().len();
    journal
        .audit
        .record("protect", Some(&format!("{count} entries encrypted")));

    output::tip("Keep your code safe: it cannot be recovered.");
    output::tip("Run `calmjournal autolock on` to lock after inactivity in a session.");

    Ok(())
}
