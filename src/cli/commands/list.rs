//! `calmjournal list` — display all entries in a table.

use crate::cli::output;
use crate::cli::{open_journal, unlock_if_needed, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut journal = open_journal(cli)?;
    unlock_if_needed(&mut journal.controller, &journal.audit)?;

    let entries = journal.controller.readable_entries()?;

    output::info(&format!(
        "{} — {} win(s)",
        journal.controller.store().path().display(),
        entries.len()
    ));

    output::print_entries_table(&entries);

    Ok(())
}
