use serde::{Deserialize, Serialize};

/// Tunable session limits. The control panel may rewrite these at any time;
/// the loop and the rate limiter re-read them at every iteration boundary
/// rather than snapshotting them at start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum number of unfollow actions per session (safe daily limit).
    pub max_actions: u32,
    /// Minimum delay in milliseconds between processed cells.
    pub min_delay_ms: u64,
    /// Maximum delay in milliseconds between processed cells.
    pub max_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_actions: 190,
            min_delay_ms: 20_000,
            max_delay_ms: 35_000,
        }
    }
}

/// Per-cell outcome recorded in the session journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Acted,
    Skipped,
    Errored,
}

impl ActionOutcome {
    pub fn label(self) -> &'static str {
        match self {
            ActionOutcome::Acted => "acted",
            ActionOutcome::Skipped => "skipped",
            ActionOutcome::Errored => "errored",
        }
    }
}

/// One journal line. Appended in occurrence order, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    /// Extracted identity token, or `"unknown"`.
    pub identity: String,
    pub outcome: ActionOutcome,
    pub reason: String,
}

/// Why the session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCause {
    /// Action limit reached or candidate list exhausted.
    Completed,
    /// External stop intent, honored at a loop boundary.
    UserStopped,
}

/// Lifecycle state of a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Paused,
    Stopped(StopCause),
}

impl SessionStatus {
    /// Panel-facing label: `running`, `paused`, or `stopped`.
    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Stopped(_) => "stopped",
        }
    }
}

/// Read-only projection of session state for an external control panel.
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub processed: u32,
    pub skipped: u32,
    pub remaining: u32,
    pub percent_complete: u8,
    pub current_identity: Option<String>,
    pub status: &'static str,
}

/// Final session report: counts plus the full ordered journal.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: uuid::Uuid,
    pub started_at: String,
    pub finished_at: String,
    pub processed: u32,
    pub skipped: u32,
    pub stop_cause: StopCause,
    pub entries: Vec<LogEntry>,
}

impl SessionReport {
    /// Render the journal as an aligned text table (the console report the
    /// binary prints at session end).
    pub fn render_table(&self) -> String {
        let mut id_w = "identity".len();
        for e in &self.entries {
            id_w = id_w.max(e.identity.len());
        }

        let mut table = String::new();
        table.push_str(&format!(
            "{:<8}  {:<7}  {:<id_w$}  reason\n",
            "time", "outcome", "identity"
        ));
        for e in &self.entries {
            // Keep the table narrow: clock portion of the RFC 3339 stamp.
            let clock = e.timestamp.get(11..19).unwrap_or(e.timestamp.as_str());
            table.push_str(&format!(
                "{:<8}  {:<7}  {:<id_w$}  {}\n",
                clock,
                e.outcome.label(),
                e.identity,
                e.reason
            ));
        }
        table.push_str(&format!(
            "\nprocessed: {}  skipped: {}  stop: {:?}\n",
            self.processed, self.skipped, self.stop_cause
        ));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(SessionStatus::Running.label(), "running");
        assert_eq!(SessionStatus::Paused.label(), "paused");
        assert_eq!(
            SessionStatus::Stopped(StopCause::UserStopped).label(),
            "stopped"
        );
        assert_eq!(
            SessionStatus::Stopped(StopCause::Completed).label(),
            "stopped"
        );
    }

    #[test]
    fn test_report_table_contains_entries() {
        let report = SessionReport {
            session_id: uuid::Uuid::new_v4(),
            started_at: "2025-12-01T10:00:00+00:00".into(),
            finished_at: "2025-12-01T10:05:00+00:00".into(),
            processed: 1,
            skipped: 1,
            stop_cause: StopCause::Completed,
            entries: vec![
                LogEntry {
                    timestamp: "2025-12-01T10:00:01+00:00".into(),
                    identity: "johndoe".into(),
                    outcome: ActionOutcome::Acted,
                    reason: "confirmed".into(),
                },
                LogEntry {
                    timestamp: "2025-12-01T10:00:02+00:00".into(),
                    identity: "unknown".into(),
                    outcome: ActionOutcome::Skipped,
                    reason: "no profile link in cell".into(),
                },
            ],
        };
        let table = report.render_table();
        assert!(table.contains("johndoe"));
        assert!(table.contains("no profile link in cell"));
        assert!(table.contains("processed: 1"));
    }
}
