//! Journal module — entries and their persisted form.
//!
//! This module provides:
//! - The `Entry` record (`entry`)
//! - The JSON journal document, backups, and import payloads (`document`)
//! - The `Persistence` seam with file and in-memory stores (`store`)

pub mod document;
pub mod entry;
pub mod store;

// Re-export the most commonly used items.
pub use document::{ImportPayload, JournalDocument};
pub use entry::Entry;
pub use store::{JsonFileStore, MemoryStore, Persistence};
