//! `LockController` — the lock/unlock state machine.
//!
//! Wraps a [`VaultState`] with its persistence sink, the user-notification
//! callback, the auto-lock timer, and the import handshake. Every method
//! takes `&mut self`, so two transitions can never interleave over the
//! same entries.
//!
//! | From         | Event                       | To           |
//! |--------------|-----------------------------|--------------|
//! | Unprotected  | `enable_protection` ok      | Unlocked     |
//! | LockedAtRest | `unlock` with matching code | Unlocked     |
//! | LockedAtRest | `unlock` with wrong code    | LockedAtRest |
//! | Unlocked     | `lock` / timer expiry       | LockedAtRest |
//! | Unlocked     | `disable_protection`        | Unprotected  |

use std::time::Duration;

use tracing::{debug, info, warn};

use super::autolock::{AutoLockTimer, Clock, SystemClock};
use super::import::PendingImport;
use super::state::{LockState, VaultState};
use super::VaultConfig;
use crate::errors::{JournalError, Result};
use crate::journal::{Entry, ImportPayload, Persistence};

/// Kind of user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Fire-and-forget user notifications.
pub trait Notifier {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Drops every notice.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _kind: NoticeKind, _message: &str) {}
}

/// What happened when an import was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStart {
    /// Plain payload, merged straight away.
    Merged { added: usize },
    /// Encrypted payload held until `submit_import_pin`.
    AwaitingPin { entry_count: usize },
}

/// The lock state machine over a vault and its store.
pub struct LockController<S: Persistence> {
    vault: VaultState,
    store: S,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    timer: AutoLockTimer,
    pending_import: Option<PendingImport>,
}

impl<S: Persistence> LockController<S> {
    /// Start a controller over a restored vault.
    ///
    /// The vault comes back `LockedAtRest` if protected, so no timer is
    /// armed until the first unlock.
    pub fn new(vault: VaultState, store: S) -> Self {
        Self {
            vault,
            store,
            notifier: Box::new(NullNotifier),
            clock: Box::new(SystemClock),
            timer: AutoLockTimer::new(),
            pending_import: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> LockState {
        self.vault.lock_state()
    }

    pub fn config(&self) -> &VaultConfig {
        self.vault.config()
    }

    pub fn vault(&self) -> &VaultState {
        &self.vault
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn timer(&self) -> &AutoLockTimer {
        &self.timer
    }

    /// Time left before the auto-lock fires, if it is armed.
    pub fn auto_lock_remaining(&self) -> Option<Duration> {
        self.timer.remaining(self.clock.now())
    }

    pub fn pending_import(&self) -> Option<&PendingImport> {
        self.pending_import.as_ref()
    }

    /// Plaintext entries, available while unprotected or unlocked.
    pub fn readable_entries(&self) -> Result<Vec<Entry>> {
        self.vault.readable_entries()
    }

    /// Entries as they are (or would be) stored.
    pub fn at_rest_entries(&self) -> Result<Vec<Entry>> {
        self.vault.at_rest_entries()
    }

    pub fn verify(&self, pin: &str) -> bool {
        self.vault.verify(pin)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    pub fn enable_protection(&mut self, pin: &str) -> Result<()> {
        let result = self.vault.enable_protection(pin, &mut self.store);
        if result.is_ok() {
            self.arm_timer();
        }
        self.report(result, "Your journal is now protected.")
    }

    pub fn disable_protection(&mut self) -> Result<()> {
        let result = self.vault.disable_protection(&mut self.store);
        if result.is_ok() {
            self.timer.clear();
        }
        self.report(result, "Privacy protection removed.")
    }

    pub fn change_code(&mut self, old_pin: &str, new_pin: &str) -> Result<()> {
        let result = self.vault.change_code(old_pin, new_pin, &mut self.store);
        self.report(result, "Your Calm Code has been changed.")
    }

    /// Submit a PIN from the lock screen.
    pub fn unlock(&mut self, pin: &str) -> Result<()> {
        let result = self.vault.unlock(pin, &mut self.store);
        if result.is_ok() {
            self.arm_timer();
        }
        self.report(result, "Welcome back.")
    }

    /// Encrypt, drop the key, and clear the timer.
    pub fn lock(&mut self) -> Result<()> {
        let was_unlocked = self.state() == LockState::Unlocked;
        let result = self.vault.lock(&mut self.store);
        if !self.vault.has_session_key() {
            self.timer.clear();
        }
        if was_unlocked {
            self.report(result, "Journal locked.")
        } else {
            result
        }
    }

    /// Turn auto-lock on or off; arms or clears the timer to match.
    pub fn set_auto_lock(&mut self, enabled: bool, minutes: Option<u32>) -> Result<()> {
        let result = self.vault.set_auto_lock(enabled, minutes, &mut self.store);
        if result.is_ok() {
            if enabled {
                self.arm_timer();
            } else {
                self.timer.clear();
            }
        }
        let message = if enabled {
            "Auto-lock enabled."
        } else {
            "Auto-lock disabled."
        };
        self.report(result, message)
    }

    /// User activity: push the auto-lock deadline back.
    pub fn record_activity(&mut self) {
        if self.state() == LockState::Unlocked && self.config().auto_lock_enabled() {
            self.arm_timer();
        }
    }

    /// Fire the auto-lock if its deadline has passed. Returns whether it
    /// fired.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.timer.expired(self.clock.now()) {
            return Ok(false);
        }
        info!("auto-lock deadline reached");
        self.lock()?;
        Ok(true)
    }

    /// Add a new plaintext entry.
    pub fn add_entry(&mut self, entry: Entry) -> Result<()> {
        self.vault.add_entry(entry, &mut self.store)
    }

    // ------------------------------------------------------------------
    // Import
    // ------------------------------------------------------------------

    /// Route a foreign payload: plain ones merge immediately, encrypted
    /// ones wait for their code.
    pub fn start_import(&mut self, payload: ImportPayload) -> Result<ImportStart> {
        if payload.needs_pin() {
            let entry_count = self.start_import_decrypt(payload)?;
            Ok(ImportStart::AwaitingPin { entry_count })
        } else {
            let added = self.import_plain(payload)?;
            Ok(ImportStart::Merged { added })
        }
    }

    /// Merge an unencrypted payload by id.
    pub fn import_plain(&mut self, payload: ImportPayload) -> Result<usize> {
        if payload.has_encrypted_entries() {
            return Err(JournalError::InvalidImport(
                "payload is encrypted — it needs its Calm Code".into(),
            ));
        }
        // Tags ride along with the save that merges the entries.
        self.store.stage_tags(&payload.tags);
        let result = self.vault.merge_entries(payload.entries, &mut self.store);
        if result.is_err() {
            self.store.discard_staged_tags();
        }
        let added = *result.as_ref().unwrap_or(&0);
        self.report(result, &format!("Imported {added} new entries!"))
    }

    /// Hold an encrypted foreign payload. Replaces any earlier pending one.
    pub fn start_import_decrypt(&mut self, payload: ImportPayload) -> Result<usize> {
        let pending = PendingImport::new(payload)?;
        let count = pending.entry_count();
        self.pending_import = Some(pending);
        debug!(entries = count, "encrypted import waiting for code");
        self.notifier
            .notify(NoticeKind::Success, "Encrypted backup detected.");
        Ok(count)
    }

    /// Decrypt the pending import with its code and merge it.
    ///
    /// Wrong codes and undecryptable entries leave the pending import in
    /// place and the local journal untouched.
    pub fn submit_import_pin(&mut self, pin: &str) -> Result<usize> {
        let pending = self
            .pending_import
            .as_ref()
            .ok_or(JournalError::NoPendingImport)?;

        let decrypted = match pending.decrypt(pin) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("import code rejected");
                return self.report(Err(e), "");
            }
        };

        self.store.stage_tags(pending.tags());
        let result = self.vault.merge_entries(decrypted, &mut self.store);
        if result.is_ok() {
            self.pending_import = None;
        } else {
            self.store.discard_staged_tags();
        }
        let added = *result.as_ref().unwrap_or(&0);
        self.report(result, &format!("Imported and decrypted {added} entries!"))
    }

    /// Drop the pending import, if any.
    pub fn cancel_import_decrypt(&mut self) {
        if self.pending_import.take().is_some() {
            self.notifier.notify(NoticeKind::Success, "Import cancelled.");
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn arm_timer(&mut self) {
        let config = self.vault.config();
        if self.vault.lock_state() == LockState::Unlocked && config.auto_lock_enabled() {
            let minutes = config.auto_lock_minutes();
            self.timer.arm(self.clock.now(), minutes);
        } else {
            self.timer.clear();
        }
    }

    fn report<T>(&self, result: Result<T>, success: &str) -> Result<T> {
        match &result {
            Ok(_) => self.notifier.notify(NoticeKind::Success, success),
            Err(e) if e.is_recoverable() => {
                self.notifier
                    .notify(NoticeKind::Failure, "Incorrect code. Try again...");
            }
            Err(e) => self.notifier.notify(NoticeKind::Failure, &e.to_string()),
        }
        result
    }
}
