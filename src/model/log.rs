//! Activity log. Fire-and-forget: logging never fails and never gates
//! engine behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub category: String,
    pub message: String,
    /// Bastion turn the entry was written on.
    pub turn: u32,
}

/// Wire shape accepted at load time. Very old saves stored bare strings;
/// those resolve to a structured entry with an empty category immediately,
/// so the ambiguity never leaks past deserialization.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LogEntryRepr {
    Structured {
        category: String,
        message: String,
        #[serde(default)]
        turn: u32,
    },
    Legacy(String),
}

impl From<LogEntryRepr> for LogEntry {
    fn from(repr: LogEntryRepr) -> Self {
        match repr {
            LogEntryRepr::Structured {
                category,
                message,
                turn,
            } => LogEntry {
                category,
                message,
                turn,
            },
            LogEntryRepr::Legacy(message) => LogEntry {
                category: String::new(),
                message,
                turn: 0,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl<'de> Deserialize<'de> for ActivityLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Accept either the wrapped form or a bare entry array.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Wrapped { entries: Vec<LogEntryRepr> },
            Bare(Vec<LogEntryRepr>),
        }
        let entries = match Repr::deserialize(deserializer)? {
            Repr::Wrapped { entries } | Repr::Bare(entries) => entries,
        };
        Ok(ActivityLog {
            entries: entries.into_iter().map(LogEntry::from).collect(),
        })
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, newest first.
    pub fn log(&mut self, turn: u32, category: &str, message: impl Into<String>) {
        self.entries.insert(
            0,
            LogEntry {
                category: category.to_string(),
                message: message.into(),
                turn,
            },
        );
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
