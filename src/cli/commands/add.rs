//! `calmjournal add` — record a new win.

use crate::cli::output;
use crate::cli::{open_journal, unlock_if_needed, Cli};
use crate::errors::{JournalError, Result};
use crate::journal::entry::next_id;
use crate::journal::{Entry, Persistence};

/// Fields of a new entry as given on the command line.
pub struct NewEntry<'a> {
    pub text: &'a str,
    pub note: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub emoji: Option<&'a str>,
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, new: &NewEntry<'_>) -> Result<()> {
    let text = new.text.trim();
    if text.is_empty() {
        return Err(JournalError::CommandFailed(
            "a win needs some text".into(),
        ));
    }

    let mut journal = open_journal(cli)?;
    let controller = &mut journal.controller;
    unlock_if_needed(controller, &journal.audit)?;

    let mut entry = Entry::new(next_id(controller.vault().entries()), text);
    if let Some(note) = new.note {
        entry = entry.with_note(note.trim());
    }
    if let Some(tag) = new.tag.map(str::trim).filter(|t| !t.is_empty()) {
        controller.store_mut().stage_tags(&[tag.to_string()]);
        entry = entry.with_tag(tag);
    }
    if let Some(emoji) = new.emoji {
        entry = entry.with_emoji(emoji);
    }

    controller.add_entry(entry)?;

    output::success("Win saved.");
    Ok(())
}
