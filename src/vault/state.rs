//! `VaultState` — lock config, session key, and the entry collection.
//!
//! Every operation that rewrites entries works on a staging copy:
//! encrypt or decrypt into a new `Vec`, persist the at-rest form, and only
//! then swap it in. A failure anywhere before the swap leaves memory and
//! storage exactly as they were.
//!
//! In memory the collection is plaintext when unprotected, ciphertext when
//! locked, and either form while unlocked (enabling protection leaves it
//! encrypted, unlocking decrypts it). What reaches storage is always the
//! at-rest form: fully encrypted whenever `is_locked` is set.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::config::VaultConfig;
use crate::crypto::{decrypt_field, derive_key, encrypt_field, hash_pin, validate_pin, verify_pin};
use crate::crypto::SessionKey;
use crate::errors::{JournalError, Result};
use crate::journal::entry::{sort_newest_first, Entry};
use crate::journal::Persistence;

/// Where the vault sits in its lock lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No Calm Code set; entries are plaintext.
    Unprotected,
    /// Calm Code set, no session key in memory.
    LockedAtRest,
    /// Calm Code set and the session key is held.
    Unlocked,
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unprotected => "unprotected",
            Self::LockedAtRest => "locked",
            Self::Unlocked => "unlocked",
        };
        f.write_str(label)
    }
}

/// Owner of the lock config, the session key, and write access to entries.
#[derive(Debug)]
pub struct VaultState {
    config: VaultConfig,
    entries: Vec<Entry>,
    session_key: Option<SessionKey>,
}

impl VaultState {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Restore a vault from persisted parts.
    ///
    /// No session key survives a restart, so a protected journal always
    /// comes back `LockedAtRest`.
    pub fn restore(config: VaultConfig, entries: Vec<Entry>) -> Result<Self> {
        config.validate()?;

        let mut seen = HashSet::with_capacity(entries.len());
        if let Some(dup) = entries.iter().find(|e| !seen.insert(e.id)) {
            return Err(JournalError::InvalidJournal(format!(
                "entry id {} appears more than once",
                dup.id
            )));
        }

        if !config.is_locked() && entries.iter().any(|e| e.encrypted) {
            return Err(JournalError::InvalidJournal(
                "journal is unprotected but contains encrypted entries".into(),
            ));
        }
        if config.is_locked() {
            let plaintext = entries.iter().filter(|e| !e.encrypted).count();
            if plaintext > 0 {
                // Older browser journals saved decrypted entries while unlocked.
                // They get sealed on the next unlock.
                warn!(plaintext, "protected journal holds plaintext entries");
            }
        }

        Ok(Self {
            config,
            entries,
            session_key: None,
        })
    }

    /// A fresh, empty, unprotected vault.
    pub fn empty() -> Self {
        Self {
            config: VaultConfig::default(),
            entries: Vec::new(),
            session_key: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// The collection as currently held in memory.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn has_session_key(&self) -> bool {
        self.session_key.is_some()
    }

    pub fn lock_state(&self) -> LockState {
        match (self.config.is_locked(), self.session_key.is_some()) {
            (false, _) => LockState::Unprotected,
            (true, false) => LockState::LockedAtRest,
            (true, true) => LockState::Unlocked,
        }
    }

    /// Check a PIN against the stored verification hash.
    pub fn verify(&self, pin: &str) -> bool {
        self.config
            .verification_hash()
            .is_some_and(|hash| verify_pin(pin, hash))
    }

    /// Plaintext view of every entry. Fails while locked.
    pub fn readable_entries(&self) -> Result<Vec<Entry>> {
        match (self.lock_state(), &self.session_key) {
            (LockState::Unprotected, _) => Ok(self.entries.clone()),
            (LockState::Unlocked, Some(key)) => decrypt_entries(&self.entries, key),
            _ => Err(JournalError::NotUnlocked),
        }
    }

    /// The collection as it must look in storage.
    pub fn at_rest_entries(&self) -> Result<Vec<Entry>> {
        match &self.session_key {
            Some(key) => encrypt_entries(&self.entries, key),
            None => Ok(self.entries.clone()),
        }
    }

    // ------------------------------------------------------------------
    // Protection lifecycle
    // ------------------------------------------------------------------

    /// Set a Calm Code and encrypt every entry under it.
    pub fn enable_protection(&mut self, pin: &str, store: &mut dyn Persistence) -> Result<()> {
        if self.config.is_locked() {
            return Err(JournalError::ProtectionAlreadyEnabled);
        }
        validate_pin(pin)?;

        let key = derive_key(pin);
        let sealed = encrypt_entries(&self.entries, &key)?;
        let config = self.config.protected(hash_pin(pin));

        store.save(&config, &sealed)?;

        self.config = config;
        self.entries = sealed;
        self.session_key = Some(key);
        info!(entries = self.entries.len(), "protection enabled");
        Ok(())
    }

    /// Remove the Calm Code and decrypt every entry. Requires the session key.
    pub fn disable_protection(&mut self, store: &mut dyn Persistence) -> Result<()> {
        let key = self.require_key()?;

        let opened = decrypt_entries(&self.entries, key)?;
        let config = self.config.unprotected();

        store.save(&config, &opened)?;

        self.config = config;
        self.entries = opened;
        self.session_key = None;
        info!(entries = self.entries.len(), "protection disabled");
        Ok(())
    }

    /// Re-key every entry from `old_pin` to `new_pin`.
    ///
    /// Works from both `LockedAtRest` and `Unlocked`; the lock state is
    /// the same afterwards, with the new key held if it was unlocked.
    ///
    /// A malformed `old_pin` or `new_pin` fails with `InvalidPin` before
    /// any hash check; a well-formed but wrong `old_pin` fails with
    /// `AuthenticationFailed`.
    pub fn change_code(
        &mut self,
        old_pin: &str,
        new_pin: &str,
        store: &mut dyn Persistence,
    ) -> Result<()> {
        if !self.config.is_locked() {
            return Err(JournalError::ProtectionNotEnabled);
        }
        validate_pin(old_pin)?;
        validate_pin(new_pin)?;
        if !self.verify(old_pin) {
            warn!("change-code rejected: old code does not match");
            return Err(JournalError::AuthenticationFailed);
        }

        let old_key = derive_key(old_pin);
        let opened = decrypt_entries(&self.entries, &old_key)?;
        drop(old_key);

        let new_key = derive_key(new_pin);
        let sealed = encrypt_entries(&opened, &new_key)?;
        let config = self.config.protected(hash_pin(new_pin));

        store.save(&config, &sealed)?;

        let was_unlocked = self.session_key.is_some();
        self.config = config;
        self.entries = sealed;
        self.session_key = was_unlocked.then_some(new_key);
        info!(entries = self.entries.len(), "calm code changed");
        Ok(())
    }

    /// Verify `pin`, derive the session key, and decrypt entries in memory.
    ///
    /// On a wrong PIN nothing changes and no key material is kept. The code
    /// is checked even when already unlocked; a correct one is then a no-op.
    pub fn unlock(&mut self, pin: &str, store: &mut dyn Persistence) -> Result<()> {
        if self.lock_state() == LockState::Unprotected {
            return Err(JournalError::ProtectionNotEnabled);
        }
        validate_pin(pin)?;
        if !self.verify(pin) {
            warn!("unlock rejected: code does not match");
            return Err(JournalError::AuthenticationFailed);
        }
        if self.session_key.is_some() {
            return Ok(());
        }

        let key = derive_key(pin);
        let opened = decrypt_entries(&self.entries, &key)?;
        let at_rest = encrypt_entries(&self.entries, &key)?;

        store.save(&self.config, &at_rest)?;

        self.entries = opened;
        self.session_key = Some(key);
        info!(entries = self.entries.len(), "journal unlocked");
        Ok(())
    }

    /// Encrypt entries and drop the session key.
    ///
    /// Already locked (or unprotected) journals are left alone. If only the
    /// final save fails, the journal still ends up locked in memory; the
    /// stored copy was already at rest.
    pub fn lock(&mut self, store: &mut dyn Persistence) -> Result<()> {
        let Some(key) = self.session_key.as_ref() else {
            return Ok(());
        };

        let sealed = encrypt_entries(&self.entries, key)?;
        self.entries = sealed;
        self.session_key = None;
        info!(entries = self.entries.len(), "journal locked");

        store.save(&self.config, &self.entries)
    }

    /// Turn the auto-lock on or off, optionally changing the delay.
    pub fn set_auto_lock(
        &mut self,
        enabled: bool,
        minutes: Option<u32>,
        store: &mut dyn Persistence,
    ) -> Result<()> {
        self.require_key()?;
        let config = self.config.with_auto_lock(enabled, minutes)?;
        let at_rest = self.at_rest_entries()?;

        store.save(&config, &at_rest)?;

        self.config = config;
        debug!(
            enabled,
            minutes = self.config.auto_lock_minutes(),
            "auto-lock updated"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entry writes
    // ------------------------------------------------------------------

    /// Add a plaintext entry at the top of the journal.
    pub fn add_entry(&mut self, mut entry: Entry, store: &mut dyn Persistence) -> Result<()> {
        if self.lock_state() == LockState::LockedAtRest {
            return Err(JournalError::NotUnlocked);
        }
        if self.entries.iter().any(|e| e.id == entry.id) {
            return Err(JournalError::DuplicateEntry(entry.id));
        }
        entry.encrypted = false;

        let mut staged = Vec::with_capacity(self.entries.len() + 1);
        staged.push(entry);
        staged.extend(self.entries.iter().cloned());

        let at_rest = match &self.session_key {
            Some(key) => encrypt_entries(&staged, key)?,
            None => staged.clone(),
        };
        store.save(&self.config, &at_rest)?;

        self.entries = staged;
        Ok(())
    }

    /// Merge plaintext entries by id; ids already present are left alone.
    ///
    /// The merged collection is sorted newest first. When unlocked it is
    /// kept uniformly plaintext in memory and persisted fully encrypted.
    /// Returns the number of entries added.
    pub fn merge_entries(
        &mut self,
        incoming: Vec<Entry>,
        store: &mut dyn Persistence,
    ) -> Result<usize> {
        if self.lock_state() == LockState::LockedAtRest {
            return Err(JournalError::NotUnlocked);
        }
        if incoming.iter().any(|e| e.encrypted) {
            return Err(JournalError::InvalidImport(
                "entries must be decrypted before merging".into(),
            ));
        }

        let mut seen: HashSet<i64> = self.entries.iter().map(|e| e.id).collect();
        let fresh: Vec<Entry> = incoming.into_iter().filter(|e| seen.insert(e.id)).collect();
        let added = fresh.len();

        let (staged, at_rest) = match &self.session_key {
            Some(key) => {
                let mut merged = decrypt_entries(&self.entries, key)?;
                merged.extend(fresh);
                sort_newest_first(&mut merged);
                let sealed = encrypt_entries(&merged, key)?;
                (merged, sealed)
            }
            None => {
                let mut merged = self.entries.clone();
                merged.extend(fresh);
                sort_newest_first(&mut merged);
                (merged.clone(), merged)
            }
        };

        store.save(&self.config, &at_rest)?;

        self.entries = staged;
        debug!(added, total = self.entries.len(), "entries merged");
        Ok(added)
    }

    // ------------------------------------------------------------------
    // Bulk passes
    // ------------------------------------------------------------------

    /// Encrypt every plaintext entry in memory. Without a session key this
    /// is a no-op. Returns how many entries were encrypted.
    pub fn bulk_encrypt(&mut self) -> Result<usize> {
        let Some(key) = self.session_key.as_ref() else {
            return Ok(0);
        };
        let pending = self.entries.iter().filter(|e| !e.encrypted).count();
        self.entries = encrypt_entries(&self.entries, key)?;
        Ok(pending)
    }

    /// Decrypt every encrypted entry in memory. Without a session key this
    /// is a no-op. Returns how many entries were decrypted.
    pub fn bulk_decrypt(&mut self) -> Result<usize> {
        let Some(key) = self.session_key.as_ref() else {
            return Ok(0);
        };
        let pending = self.entries.iter().filter(|e| e.encrypted).count();
        self.entries = decrypt_entries(&self.entries, key)?;
        Ok(pending)
    }

    fn require_key(&self) -> Result<&SessionKey> {
        match (self.config.is_locked(), &self.session_key) {
            (false, _) => Err(JournalError::ProtectionNotEnabled),
            (true, None) => Err(JournalError::NotUnlocked),
            (true, Some(key)) => Ok(key),
        }
    }
}

/// Encrypt a copy of `entries`, skipping ones already encrypted.
///
/// All-or-nothing: any failure yields `BulkOperationFailed` and no copy.
pub fn encrypt_entries(entries: &[Entry], key: &SessionKey) -> Result<Vec<Entry>> {
    transform_entries(entries, |entry| {
        if entry.encrypted {
            return Ok(entry.clone());
        }
        Ok(Entry {
            text: encrypt_field(key, &entry.text)?,
            note: encrypt_field(key, &entry.note)?,
            encrypted: true,
            ..entry.clone()
        })
    })
}

/// Decrypt a copy of `entries`, skipping ones already plaintext.
///
/// All-or-nothing: any failure yields `BulkOperationFailed` and no copy.
pub fn decrypt_entries(entries: &[Entry], key: &SessionKey) -> Result<Vec<Entry>> {
    transform_entries(entries, |entry| {
        if !entry.encrypted {
            return Ok(entry.clone());
        }
        Ok(Entry {
            text: decrypt_field(key, &entry.text)?,
            note: decrypt_field(key, &entry.note)?,
            encrypted: false,
            ..entry.clone()
        })
    })
}

fn transform_entries<F>(entries: &[Entry], mut f: F) -> Result<Vec<Entry>>
where
    F: FnMut(&Entry) -> Result<Entry>,
{
    let mut staged = Vec::with_capacity(entries.len());
    let mut failed = 0;
    for entry in entries {
        match f(entry) {
            Ok(done) => staged.push(done),
            Err(e) => {
                debug!(id = entry.id, error = %e, "entry failed bulk pass");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        warn!(failed, total = entries.len(), "bulk pass rolled back");
        return Err(JournalError::BulkOperationFailed {
            failed,
            total: entries.len(),
        });
    }
    Ok(staged)
}
