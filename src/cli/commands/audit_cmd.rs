//! `calmjournal audit` — display the audit log.
//!
//! Usage:
//!   calmjournal audit               # show last 50 entries
//!   calmjournal audit --last 20     # show last 20

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{journal_path, load_settings, Cli};
use crate::errors::{JournalError, Result};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let (cwd, settings) = load_settings()?;
    let path = journal_path(cli, &settings, &cwd);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => cwd,
    };

    if !AuditLog::db_path(&dir).exists() {
        output::info("No audit entries found.");
        return Ok(());
    }

    let audit = AuditLog::open(&dir)
        .ok_or_else(|| JournalError::AuditError("failed to open audit database".into()))?;

    let entries = audit.query(last)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Journal", "Details"]);

    for entry in entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let op = colorize_operation(&entry.operation);
        let details = entry.details.as_deref().unwrap_or("-");

        table.add_row(vec![time, op, entry.journal.clone(), details.to_string()]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "protect" | "unlock" => style(op).green().to_string(),
        "lock" => style(op).blue().to_string(),
        "unprotect" | "reset" | "unlock-failed" => style(op).red().to_string(),
        "change-code" => style(op).yellow().to_string(),
        "export" | "import" => style(op).cyan().to_string(),
        _ => op.to_string(),
    }
}
