//! Append-only session journal.

use std::sync::Mutex;

use chrono::Utc;
use tracing::{info, warn};

use crate::core::types::{ActionOutcome, LogEntry};

/// Ordered record of every per-cell outcome. Entries are appended as they
/// occur and surfaced unmodified in the final report.
#[derive(Debug, Default)]
pub struct SessionJournal {
    entries: Mutex<Vec<LogEntry>>,
}

impl SessionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, identity: &str, outcome: ActionOutcome, reason: &str) {
        match outcome {
            ActionOutcome::Acted => info!("unfollowed @{} ({})", identity, reason),
            ActionOutcome::Skipped => info!("skipped @{} ({})", identity, reason),
            ActionOutcome::Errored => warn!("error on @{}: {}", identity, reason),
        }
        self.entries.lock().unwrap().push(LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            identity: identity.to_string(),
            outcome,
            reason: reason.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all entries in occurrence order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}
