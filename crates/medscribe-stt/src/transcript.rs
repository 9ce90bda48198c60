//! Committed transcript entries and the append-only transcript log

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use medscribe_foundation::SharedClock;

/// Generates session-unique entry sequence numbers
static ENTRY_SEQ: AtomicU64 = AtomicU64::new(1);

/// Next entry sequence number
pub fn next_entry_seq() -> u64 {
    ENTRY_SEQ.fetch_add(1, Ordering::SeqCst)
}

/// One committed segment of the consultation. Immutable once created;
/// created only by the controller when a provider segment is final.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub language: String,
}

impl TranscriptEntry {
    /// Commit a final segment. `text` must already be trimmed and
    /// non-empty; the controller enforces that before calling.
    pub fn commit(text: String, language: String, clock: &SharedClock) -> Self {
        let now = clock.now();
        Self {
            id: format!("trans-{}-{}", now.timestamp_millis(), next_entry_seq()),
            text,
            timestamp: now,
            language,
        }
    }
}

/// Append-only ordered sequence of committed entries. Insertion order is
/// chronological commit order; no reordering, no dedup.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the log for readers. Readers never iterate the live
    /// structure while the controller may append.
    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        self.entries.clone()
    }

    /// Newline-joined entry text in log order; the consultation
    /// transcript handed to report generation.
    pub fn joined_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Shared form of the log: single writer (the entry pump), snapshot
/// readers.
pub type SharedTranscriptLog = Arc<RwLock<TranscriptLog>>;

pub fn shared_log() -> SharedTranscriptLog {
    Arc::new(RwLock::new(TranscriptLog::new()))
}
