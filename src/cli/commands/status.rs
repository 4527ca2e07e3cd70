//! `calmjournal status` — show lock state without asking for the code.

use console::style;

use crate::cli::output;
use crate::cli::{open_journal, Cli};
use crate::errors::Result;
use crate::vault::LockState;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let journal = open_journal(cli)?;
    let controller = &journal.controller;
    let config = controller.config();

    let state = match controller.state() {
        LockState::Unprotected => style("unprotected").yellow(),
        LockState::LockedAtRest => style("locked").green(),
        LockState::Unlocked => style("unlocked").cyan(),
    };

    println!("Journal:   {}", controller.store().path().display());
    println!("Privacy:   {state}");
    println!("Entries:   {}", controller.vault().entries().len());

    if config.is_locked() {
        let auto_lock = if config.auto_lock_enabled() {
            format!("on, after {} minutes", config.auto_lock_minutes())
        } else {
            "off".to_string()
        };
        println!("Auto-lock: {auto_lock}");
    } else {
        output::tip("Run `calmjournal protect` to set a Calm Code.");
    }

    Ok(())
}
