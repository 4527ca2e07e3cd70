//! `calmjournal session` — an interactive loop with auto-lock.
//!
//! Every line read counts as activity. Stdin is read on its own thread, and
//! the loop waits for the next line no longer than the auto-lock deadline,
//! so an idle journal locks on time even when nothing is typed.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::cli::output;
use crate::cli::{open_journal, prompt_pin, unlock_if_needed, unlock_with, AuditSink, Cli, PIN_ENV};
use crate::errors::{JournalError, Result};
use crate::journal::entry::next_id;
use crate::journal::{Entry, Persistence};
use crate::vault::{LockController, LockState};

/// A parsed session line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    List,
    Add(String),
    Lock,
    Unlock(Option<String>),
    Status,
    AutoLock { enabled: bool, minutes: Option<u32> },
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse one line of input.
pub fn parse_line(line: &str) -> SessionCommand {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    match word {
        "" => SessionCommand::Empty,
        "list" | "ls" => SessionCommand::List,
        "add" if !rest.is_empty() => SessionCommand::Add(rest.to_string()),
        "lock" => SessionCommand::Lock,
        "unlock" => SessionCommand::Unlock((!rest.is_empty()).then(|| rest.to_string())),
        "status" => SessionCommand::Status,
        "autolock" => parse_autolock(rest).unwrap_or_else(|| SessionCommand::Unknown(line.into())),
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        _ => SessionCommand::Unknown(line.to_string()),
    }
}

fn parse_autolock(rest: &str) -> Option<SessionCommand> {
    let mut parts = rest.split_whitespace();
    let enabled = match parts.next()? {
        "on" => true,
        "off" => false,
        _ => return None,
    };
    let minutes = match parts.next() {
        Some(m) => Some(m.parse().ok()?),
        None => None,
    };
    Some(SessionCommand::AutoLock { enabled, minutes })
}

/// Longest single wait for input before the deadline is looked at again.
const MAX_IDLE_WAIT: Duration = Duration::from_secs(1);

/// Execute the `session` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut journal = open_journal(cli)?;
    unlock_if_needed(&mut journal.controller, &journal.audit)?;

    output::info("Session started. Type `help` for commands.");
    let lines = spawn_stdin_reader();
    run(&mut journal.controller, &lines, &journal.audit, MAX_IDLE_WAIT)?;

    // Leave nothing decrypted behind.
    journal.controller.lock()?;
    Ok(())
}

/// Forward stdin lines over a channel. The channel closes at end of input.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "stopped reading session input");
                    break;
                }
            }
        }
    });
    rx
}

/// Drive a session from `lines` until the channel closes or `quit` is read.
///
/// While auto-lock is armed, each wait for input is bounded by the time
/// left (and by `max_wait`), and the lock fires as soon as the deadline
/// passes whether or not a line arrived.
pub fn run<S: Persistence>(
    controller: &mut LockController<S>,
    lines: &Receiver<String>,
    audit: &AuditSink,
    max_wait: Duration,
) -> Result<()> {
    prompt();
    loop {
        let next = match controller.auto_lock_remaining() {
            Some(left) => lines.recv_timeout(left.min(max_wait)),
            None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let fired = controller.tick()?;
        if fired {
            audit.record("lock", Some("auto-lock"));
            output::info("Locked after inactivity.");
        }

        let line = match next {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                if fired {
                    prompt();
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };
        controller.record_activity();

        match parse_line(&line) {
            SessionCommand::Quit => break,
            command => {
                if let Err(e) = handle(controller, command, audit) {
                    if !e.is_recoverable() {
                        output::error(&e.to_string());
                    }
                }
            }
        }
        prompt();
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn handle<S: Persistence>(
    controller: &mut LockController<S>,
    command: SessionCommand,
    audit: &AuditSink,
) -> Result<()> {
    match command {
        SessionCommand::List => {
            let entries = controller.readable_entries()?;
            output::print_entries_table(&entries);
        }
        SessionCommand::Add(text) => {
            let entry = Entry::new(next_id(controller.vault().entries()), text);
            controller.add_entry(entry)?;
            output::success("Win saved.");
        }
        SessionCommand::Lock => {
            if controller.state() == LockState::Unlocked {
                controller.lock()?;
                audit.record("lock", None);
            } else {
                output::info("Nothing to lock.");
            }
        }
        SessionCommand::Unlock(pin) => {
            if controller.state() != LockState::LockedAtRest {
                output::info("Journal is not locked.");
                return Ok(());
            }
            let pin = match pin {
                Some(p) => zeroize::Zeroizing::new(p),
                None => prompt_pin(PIN_ENV, "Enter your Calm Code")?,
            };
            unlock_with(controller, audit, &pin)?;
        }
        SessionCommand::Status => {
            println!("Privacy: {}", controller.state());
            if let Some(left) = controller.auto_lock_remaining() {
                println!("Auto-lock in {}s", left.as_secs());
            }
        }
        SessionCommand::AutoLock { enabled, minutes } => {
            controller.set_auto_lock(enabled, minutes)?;
        }
        SessionCommand::Help => print_help(),
        SessionCommand::Empty => {}
        SessionCommand::Unknown(line) => {
            return Err(JournalError::CommandFailed(format!(
                "unknown command '{line}', type `help`"
            )));
        }
        SessionCommand::Quit => {}
    }
    Ok(())
}

fn print_help() {
    println!("  list                  show all wins");
    println!("  add <text>            record a win");
    println!("  lock                  lock now");
    println!("  unlock [code]         unlock");
    println!("  status                lock state and auto-lock countdown");
    println!("  autolock on|off [m]   toggle auto-lock, optional delay in minutes");
    println!("  quit                  lock and leave");
}
