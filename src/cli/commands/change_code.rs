//! `calmjournal change-code` — replace the Calm Code.
//!
//! Verifies the current code, decrypts every entry with it, re-encrypts
//! under the new code, and writes the journal atomically. Nothing changes
//! unless every entry makes it across.

use crate::cli::output;
use crate::cli::{open_journal, prompt_new_pin, prompt_pin, Cli, NEW_PIN_ENV, PIN_ENV};
use crate::errors::{JournalError, Result};
use crate::vault::LockState;

/// Execute the `change-code` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut journal = open_journal(cli)?;
    let controller = &mut journal.controller;

    if controller.state() == LockState::Unprotected {
        output::tip("Run `calmjournal protect` to set a Calm Code first.");
        return Err(JournalError::ProtectionNotEnabled);
    }

    // 1. Current code.
    let old_pin = prompt_pin(PIN_ENV, "Current Calm Code")?;
    if !controller.verify(&old_pin) {
        journal.audit.record("change-code", Some("rejected"));
        return Err(JournalError::AuthenticationFailed);
    }

    // 2. New code.
    output::info("Choose your new Calm Code.");
    let new_pin = prompt_new_pin(NEW_PIN_ENV)?;

    // 3. Re-key and save.
    controller.change_code(&old_pin, &new_pin)?;

    let count = controller.vault().entries().len();
    journal
        .audit
        .record("change-code", Some(&format!("{count} entries re-encrypted")));

    Ok(())
}
