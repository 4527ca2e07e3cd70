//! `calmjournal export` — write a JSON backup and a readable text copy.
//!
//! The JSON backup holds entries exactly as stored, so a protected journal
//! exports an encrypted backup that needs its Calm Code to import. The
//! readable copy is decrypted and therefore asks for the code when the
//! journal is locked.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cli::output;
use crate::cli::{open_journal, unlock_if_needed, Cli};
use crate::errors::{JournalError, Result};
use crate::journal::document::{write_document, write_private};
use crate::journal::Entry;

const RULE: &str = "====================================";
const DIVIDER: &str = "------------------------------------";

/// Execute the `export` command.
pub fn execute(cli: &Cli, output_path: Option<&str>, no_readable: bool) -> Result<()> {
    let mut journal = open_journal(cli)?;
    let now = Utc::now();

    let (encrypted, dest, backup) = {
        let controller = &journal.controller;
        if controller.vault().entries().is_empty() {
            output::info("No entries to export yet.");
            return Ok(());
        }

        let encrypted = controller.config().is_locked();
        let dest = match output_path {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(default_backup_name(encrypted, now)),
        };

        // Safety: refuse to export over the journal itself.
        if same_file(&dest, controller.store().path()) {
            return Err(JournalError::CommandFailed(
                "refusing to export over the journal file".into(),
            ));
        }

        let at_rest = controller.at_rest_entries()?;
        let backup = controller
            .store()
            .document(controller.config(), &at_rest)
            .into_backup(now);
        (encrypted, dest, backup)
    };

    write_document(&dest, &backup)?;
    let count = backup.entries.len();

    let wants_readable = !no_readable
        && journal.settings.export_readable
        && journal.controller.store().export_readable();

    let label = if encrypted { " (encrypted)" } else { "" };
    if wants_readable {
        unlock_if_needed(&mut journal.controller, &journal.audit)?;
        let entries = journal.controller.readable_entries()?;
        let text = render_readable(&entries, encrypted, now);
        let txt_path = readable_path(&dest);
        write_private(&txt_path, text.as_bytes()).map_err(|e| {
            JournalError::CommandFailed(format!("failed to write readable export: {e}"))
        })?;
        output::success(&format!(
            "Exported: JSON{label} to {} + readable TXT to {}",
            dest.display(),
            txt_path.display()
        ));
    } else {
        output::success(&format!("Exported: JSON{label} backup to {}", dest.display()));
    }

    journal.audit.record(
        "export",
        Some(&format!(
            "{count} entries{label}{}",
            if wants_readable { " + readable" } else { "" }
        )),
    );

    Ok(())
}

/// `calmjournal-backup-<ms>.json`, or the encrypted variant.
pub fn default_backup_name(encrypted: bool, now: DateTime<Utc>) -> String {
    let kind = if encrypted { "encrypted-backup" } else { "backup" };
    format!("calmjournal-{kind}-{}.json", now.timestamp_millis())
}

/// `<stem>-readable.txt` next to the JSON backup.
pub fn readable_path(json_path: &Path) -> PathBuf {
    let stem = json_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "calmjournal".to_string());
    json_path.with_file_name(format!("{stem}-readable.txt"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Render entries as a plain-text journal, oldest first.
///
/// `entries` is expected newest first, the order the journal keeps them in.
pub fn render_readable(entries: &[Entry], decrypted: bool, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "       CALMJOURNAL WINS EXPORT");
    let _ = writeln!(out, "{RULE}\n");
    let _ = writeln!(out, "Exported on: {}", now.format("%A, %B %-d, %Y"));
    let _ = writeln!(out, "Total Entries: {}", entries.len());
    if decrypted {
        let _ = writeln!(out, "Status: Decrypted for reading");
    }
    let _ = writeln!(out, "\n{RULE}\n");

    for (index, entry) in entries.iter().rev().enumerate() {
        let _ = writeln!(out, "Entry #{}", index + 1);
        let _ = writeln!(out, "Date: {}", entry.date.format("%A, %B %-d, %Y"));
        if !entry.tag.is_empty() {
            let _ = writeln!(out, "Tag: {}", entry.tag);
        }
        if !entry.emoji.is_empty() {
            let _ = writeln!(out, "Mood: {}", entry.emoji);
        }
        let _ = writeln!(out, "\n{}", entry.text);
        if !entry.note.is_empty() {
            let _ = writeln!(out, "\nNote: {}", entry.note);
        }
        let _ = writeln!(out, "\n{DIVIDER}\n");
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "   Thank you for using CalmJournal!");
    let _ = writeln!(out, "{RULE}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn readable_lists_oldest_first() {
        let entries = vec![
            Entry::new(2, "Second win").with_date(at(5)),
            Entry::new(1, "First win").with_date(at(4)),
        ];
        let text = render_readable(&entries, false, at(6));

        let first = text.find("First win").unwrap();
        let second = text.find("Second win").unwrap();
        assert!(first < second);
        assert!(text.contains("Entry #1\nDate: Monday, March 4, 2024\n"));
        assert!(text.contains("Total Entries: 2"));
        assert!(!text.contains("Decrypted for reading"));
    }

    #[test]
    fn readable_includes_optional_fields_only_when_set() {
        let entries = vec![Entry::new(1, "Ran 5k")
            .with_tag("health")
            .with_emoji("😊")
            .with_note("Felt great")
            .with_date(at(4))];
        let text = render_readable(&entries, true, at(6));

        assert!(text.contains("Tag: health\n"));
        assert!(text.contains("Mood: 😊\n"));
        assert!(text.contains("\nRan 5k\n"));
        assert!(text.contains("\nNote: Felt great\n"));
        assert!(text.contains("Status: Decrypted for reading"));

        let bare = render_readable(&[Entry::new(2, "Slept well").with_date(at(4))], false, at(6));
        assert!(!bare.contains("Tag:"));
        assert!(!bare.contains("Mood:"));
        assert!(!bare.contains("Note:"));
    }

    #[test]
    fn default_names_mark_encrypted_backups() {
        let now = at(4);
        assert!(default_backup_name(false, now).starts_with("calmjournal-backup-"));
        assert!(default_backup_name(true, now).starts_with("calmjournal-encrypted-backup-"));
        assert!(default_backup_name(true, now).ends_with(".json"));
    }

    #[test]
    fn readable_path_sits_next_to_backup() {
        assert_eq!(
            readable_path(Path::new("/tmp/out/backup.json")),
            PathBuf::from("/tmp/out/backup-readable.txt")
        );
    }
}
