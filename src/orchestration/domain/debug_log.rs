//! Append-only debug log carried by each task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp format used for every log line.
const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Newline-delimited, append-only task log.
///
/// Entries are formatted as `[YYYY-MM-DD HH:MM:SS] <message>`. Appending
/// never truncates or reorders prior lines; there is deliberately no way to
/// remove an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebugLog(String);

impl DebugLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Reconstructs a log from its persisted text.
    #[must_use]
    pub const fn from_persisted(text: String) -> Self {
        Self(text)
    }

    /// Appends a timestamped entry, preserving all prior lines exactly.
    pub fn append_entry(&mut self, timestamp: DateTime<Utc>, message: &str) {
        let line = format!("[{}] {message}", timestamp.format(LINE_TIMESTAMP_FORMAT));
        if !self.0.is_empty() {
            self.0.push('\n');
        }
        self.0.push_str(&line);
    }

    /// Returns the raw log text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the log lines in append order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }

    /// Returns `true` when no entry has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DebugLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
