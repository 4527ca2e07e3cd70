//! `calmjournal autolock` — turn the auto-lock on or off.

use crate::cli::output;
use crate::cli::{open_journal, unlock_if_needed, Cli, Toggle};
use crate::errors::{JournalError, Result};
use crate::vault::LockState;

/// Execute the `autolock` command.
pub fn execute(cli: &Cli, mode: Toggle, minutes: Option<u32>) -> Result<()> {
    let mut journal = open_journal(cli)?;
    let controller = &mut journal.controller;

    if controller.state() == LockState::Unprotected {
        output::tip("Auto-lock needs a Calm Code. Run `calmjournal protect` first.");
        return Err(JournalError::ProtectionNotEnabled);
    }

    unlock_if_needed(controller, &journal.audit)?;
    controller.set_auto_lock(mode.enabled(), minutes)?;

    if mode.enabled() {
        output::tip(&format!(
            "`calmjournal session` locks after {} minutes without input.",
            controller.config().auto_lock_minutes()
        ));
    }

    Ok(())
}
