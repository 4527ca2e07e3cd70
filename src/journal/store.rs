//! Persistence seam between the lock core and wherever the journal lives.
//!
//! The vault never writes files itself. After every state-changing
//! operation it hands the new config plus the at-rest entry list to a
//! [`Persistence`] implementation.

use std::path::{Path, PathBuf};

use super::document::{read_document, write_document, JournalDocument};
use super::entry::Entry;
use crate::errors::{JournalError, Result};
use crate::vault::VaultConfig;

/// Durable storage for the lock config and entries.
pub trait Persistence {
    /// Store the config and entries. Called with the at-rest form only:
    /// when the journal is protected, every entry is encrypted.
    fn save(&mut self, config: &VaultConfig, entries: &[Entry]) -> Result<()>;

    /// Queue tags to be folded into the stored tag list by the next
    /// successful `save`. Optional.
    fn stage_tags(&mut self, _tags: &[String]) {}

    /// Forget tags staged since the last successful `save`.
    fn discard_staged_tags(&mut self) {}
}

fn fold_unique(into: &mut Vec<String>, tags: &[String]) {
    for tag in tags {
        if !into.contains(tag) {
            into.push(tag.clone());
        }
    }
}

/// A journal stored as a JSON document on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tags: Vec<String>,
    staged_tags: Vec<String>,
    export_readable: bool,
}

impl JsonFileStore {
    /// A store for `path` that has not been read yet.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            tags: Vec::new(),
            staged_tags: Vec::new(),
            export_readable: true,
        }
    }

    /// Read the journal at `path`, keeping the non-vault parts (tags,
    /// export preference) so later saves write them back unchanged.
    pub fn open(path: &Path) -> Result<(Self, JournalDocument)> {
        let doc = read_document(path)?;
        let store = Self {
            path: path.to_path_buf(),
            tags: doc.tags.clone(),
            staged_tags: Vec::new(),
            export_readable: doc.export_readable,
        };
        Ok((store, doc))
    }

    /// Like [`open`](Self::open) but starts an empty journal when the file
    /// does not exist yet.
    pub fn open_or_default(path: &Path) -> Result<(Self, JournalDocument)> {
        match Self::open(path) {
            Err(JournalError::JournalNotFound(_)) => {
                Ok((Self::new(path), JournalDocument::default()))
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn export_readable(&self) -> bool {
        self.export_readable
    }

    pub fn set_export_readable(&mut self, value: bool) {
        self.export_readable = value;
    }

    /// Assemble the document that `save` would write.
    pub fn document(&self, config: &VaultConfig, entries: &[Entry]) -> JournalDocument {
        let mut tags = self.tags.clone();
        fold_unique(&mut tags, &self.staged_tags);
        JournalDocument {
            entries: entries.to_vec(),
            tags,
            privacy: config.clone(),
            export_readable: self.export_readable,
            ..JournalDocument::default()
        }
    }
}

impl Persistence for JsonFileStore {
    fn save(&mut self, config: &VaultConfig, entries: &[Entry]) -> Result<()> {
        write_document(&self.path, &self.document(config, entries))?;
        let staged = std::mem::take(&mut self.staged_tags);
        fold_unique(&mut self.tags, &staged);
        Ok(())
    }

    fn stage_tags(&mut self, tags: &[String]) {
        fold_unique(&mut self.staged_tags, tags);
    }

    fn discard_staged_tags(&mut self) {
        self.staged_tags.clear();
    }
}

/// In-memory store. Records every save, and can be told to fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saves: Vec<(VaultConfig, Vec<Entry>)>,
    tags: Vec<String>,
    staged_tags: Vec<String>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail with an IO error.
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    pub fn save_count(&self) -> usize {
        self.saves.len()
    }

    /// The most recently saved config and entries.
    pub fn last_saved(&self) -> Option<&(VaultConfig, Vec<Entry>)> {
        self.saves.last()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Persistence for MemoryStore {
    fn save(&mut self, config: &VaultConfig, entries: &[Entry]) -> Result<()> {
        if self.fail_saves {
            return Err(JournalError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated write failure",
            )));
        }
        self.saves.push((config.clone(), entries.to_vec()));
        let staged = std::mem::take(&mut self.staged_tags);
        fold_unique(&mut self.tags, &staged);
        Ok(())
    }

    fn stage_tags(&mut self, tags: &[String]) {
        fold_unique(&mut self.staged_tags, tags);
    }

    fn discard_staged_tags(&mut self) {
        self.staged_tags.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn json_store_round_trips_tags_and_preferences() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");

        let mut store = JsonFileStore::new(&path);
        store.stage_tags(&["work".into(), "calm".into(), "work".into()]);
        assert!(store.tags().is_empty());
        store.set_export_readable(false);
        store
            .save(&VaultConfig::default(), &[Entry::new(1, "hello")])
            .unwrap();

        let (reopened, doc) = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.tags(), ["work".to_string(), "calm".to_string()]);
        assert!(!reopened.export_readable());
        assert_eq!(doc.entries.len(), 1);
    }

    #[test]
    fn open_or_default_starts_empty() {
        let dir = TempDir::new().unwrap();
        let (store, doc) = JsonFileStore::open_or_default(&dir.path().join("new.json")).unwrap();
        assert!(doc.entries.is_empty());
        assert!(store.tags().is_empty());
    }

    #[test]
    fn memory_store_can_simulate_failures() {
        let mut store = MemoryStore::new();
        store.save(&VaultConfig::default(), &[]).unwrap();
        store.fail_saves(true);
        assert!(store.save(&VaultConfig::default(), &[]).is_err());
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn staged_tags_only_land_with_a_successful_save() {
        let mut store = MemoryStore::new();
        store.fail_saves(true);
        store.stage_tags(&["travel".into()]);
        assert!(store.save(&VaultConfig::default(), &[]).is_err());
        assert!(store.tags().is_empty());

        store.discard_staged_tags();
        store.fail_saves(false);
        store.save(&VaultConfig::default(), &[]).unwrap();
        assert!(store.tags().is_empty());

        store.stage_tags(&["calm".into()]);
        store.save(&VaultConfig::default(), &[]).unwrap();
        assert_eq!(store.tags(), ["calm".to_string()]);
    }
}
