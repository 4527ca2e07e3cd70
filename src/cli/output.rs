//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::journal::Entry;
use crate::vault::{NoticeKind, Notifier};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Shows lock notices in the terminal.
///
/// Failures print as warnings; the command's own error is reported on
/// exit.
#[derive(Debug, Default)]
pub struct CliNotifier;

impl Notifier for CliNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => success(message),
            NoticeKind::Failure => warning(message),
        }
    }
}

/// Print a table of entries (Date, Tag, Mood, Win, Note).
pub fn print_entries_table(entries: &[Entry]) {
    if entries.is_empty() {
        info("No wins recorded yet.");
        tip("Run `calmjournal add \"<what went well>\"` to add your first win.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Date", "Tag", "Mood", "Win", "Note"]);

    for e in entries {
        table.add_row(vec![
            e.date.format("%Y-%m-%d %H:%M").to_string(),
            e.tag.clone(),
            e.emoji.clone(),
            e.text.clone(),
            e.note.clone(),
        ]);
    }

    println!("{table}");
}
