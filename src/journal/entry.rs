//! The journal entry record.
//!
//! `text` and `note` hold plaintext when `encrypted` is false and a
//! base64 cipher envelope when it is true. The flag is per record, so the
//! vault layer is responsible for keeping every entry in lockstep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single journal entry ("daily win").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique id (milliseconds since the epoch at creation time).
    pub id: i64,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub note: String,

    /// Whether `text` and `note` currently hold cipher envelopes.
    #[serde(default)]
    pub encrypted: bool,

    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub emoji: String,
}

impl Entry {
    /// A plaintext entry dated now.
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            note: String::new(),
            encrypted: false,
            date: Utc::now(),
            tag: String::new(),
            emoji: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }
}

/// Pick an id for a new entry: the current millisecond timestamp, bumped
/// past any id already in use.
pub fn next_id(entries: &[Entry]) -> i64 {
    let now = Utc::now().timestamp_millis();
    let max = entries.iter().map(|e| e.id).max().unwrap_or(i64::MIN);
    now.max(max.saturating_add(1))
}

/// Sort newest first by date.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}
