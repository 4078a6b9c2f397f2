//! The sweep session state machine.
//!
//! One cell at a time, in a strict per-iteration order: stop gate, pause
//! gate, action-limit gate, then classification, then (for actionable
//! cells) scroll → settle → activate → confirmation wait. Pause and stop
//! are cooperative and only honored at these boundaries; an in-flight
//! action is always carried through its confirmation step before a stop
//! takes effect. No single bad cell ever aborts the session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::classify::{classify_cell, resolve_identity, Classification, KeywordSet};
use crate::core::guard::{EngineError, SessionGuard};
use crate::core::types::{ActionOutcome, SessionReport, SessionStatus, Settings, StopCause};
use crate::dom::{DescendantQuery, DomError, DomNode, PageDom};
use crate::session::confirm::ConfirmationWaiter;
use crate::session::delay::ActionDelay;
use crate::session::handle::SessionHandle;
use crate::session::journal::SessionJournal;

const REASON_NO_LINK: &str = "no profile link in cell";
const REASON_MUTUAL: &str = "mutual follow";
const REASON_NO_CONTROL: &str = "no unfollow control in cell";
const REASON_CONFIRMED: &str = "confirmed";
const REASON_PRESUMED: &str = "no confirmation dialog observed; presumed success";

/// Fixed loop timings. The inter-action delay range lives in [`Settings`]
/// instead, because the panel may change it mid-run.
#[derive(Debug, Clone, Copy)]
pub struct SweepOptions {
    /// Upper bound on the confirmation-dialog wait.
    pub confirm_timeout: Duration,
    /// Confirmation poll interval.
    pub confirm_poll: Duration,
    /// Poll interval while paused.
    pub pause_poll: Duration,
    /// Settle time between scrolling a control into view and activating it.
    pub settle_delay: Duration,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_millis(7_000),
            confirm_poll: Duration::from_millis(300),
            pause_poll: Duration::from_millis(500),
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// One sweep run, from guard acquisition to a terminal state.
pub struct SweepSession {
    _guard: SessionGuard,
    handle: Arc<SessionHandle>,
    journal: SessionJournal,
    keywords: KeywordSet,
    opts: SweepOptions,
    session_id: Uuid,
    started_at: String,
}

impl SweepSession {
    /// Claim session ownership and set up fresh state. Refuses immediately,
    /// creating nothing, when another session is active.
    pub fn start(
        settings: Settings,
        keywords: KeywordSet,
        opts: SweepOptions,
    ) -> Result<Self, EngineError> {
        let guard = SessionGuard::acquire()?;
        let session_id = Uuid::new_v4();
        info!("sweep session {} starting", session_id);
        Ok(Self {
            _guard: guard,
            handle: SessionHandle::new(settings),
            journal: SessionJournal::new(),
            keywords,
            opts,
            session_id,
            started_at: Utc::now().to_rfc3339(),
        })
    }

    /// The shared handle the control panel reads and writes.
    pub fn handle(&self) -> Arc<SessionHandle> {
        Arc::clone(&self.handle)
    }

    /// Run the loop to a terminal state and emit the session report.
    ///
    /// The candidate list is a one-time snapshot of the cells present when
    /// the loop starts; rows rendered later are left for the next session.
    pub async fn run(self, page: &dyn PageDom) -> Result<SessionReport, DomError> {
        let cells = page.find_all(DescendantQuery::ListCells).await?;
        info!("found {} candidate cells", cells.len());

        let mut cause = StopCause::Completed;

        for cell in &cells {
            if self.handle.stop_requested() {
                cause = StopCause::UserStopped;
                break;
            }
            self.wait_while_paused().await;
            if self.handle.stop_requested() {
                cause = StopCause::UserStopped;
                break;
            }

            let settings = self.handle.settings();
            if self.handle.processed() >= settings.max_actions {
                info!("action limit of {} reached", settings.max_actions);
                break;
            }

            match classify_cell(cell.as_ref(), &self.keywords).await {
                Ok(Classification::SkipNoLink) => {
                    self.skip(crate::classify::IDENTITY_SENTINEL, REASON_NO_LINK);
                    continue;
                }
                Ok(Classification::SkipMutual) => {
                    let identity = self.focus(cell.as_ref()).await;
                    self.skip(&identity, REASON_MUTUAL);
                    continue;
                }
                Ok(Classification::SkipNoControl) => {
                    let identity = self.focus(cell.as_ref()).await;
                    self.skip(&identity, REASON_NO_CONTROL);
                    continue;
                }
                Ok(Classification::ActOn(control)) => {
                    let identity = self.focus(cell.as_ref()).await;
                    match self.act(control.as_ref(), page).await {
                        Ok(confirmed) => {
                            self.handle.add_processed();
                            let reason = if confirmed {
                                REASON_CONFIRMED
                            } else {
                                REASON_PRESUMED
                            };
                            self.journal.record(&identity, ActionOutcome::Acted, reason);
                        }
                        Err(e) => {
                            self.handle.add_skipped();
                            self.journal
                                .record(&identity, ActionOutcome::Errored, &e.to_string());
                        }
                    }
                }
                Err(e) => {
                    // Classification reads failed (stale handle, backend
                    // hiccup). Absorb and move to the next cell.
                    self.handle.add_skipped();
                    self.journal.record(
                        crate::classify::IDENTITY_SENTINEL,
                        ActionOutcome::Errored,
                        &e.to_string(),
                    );
                    continue;
                }
            }

            // Only processed cells pace the session; pure skips move on
            // immediately.
            if self.handle.stop_requested() {
                cause = StopCause::UserStopped;
                break;
            }
            self.wait_while_paused().await;

            let delay_ms = ActionDelay::from_settings(&self.handle.settings()).sample();
            info!("waiting {}s before next cell", (delay_ms + 500) / 1000);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        self.finish(cause)
    }

    /// Resolve and publish the identity of the cell being worked on.
    async fn focus(&self, cell: &dyn DomNode) -> String {
        let identity = resolve_identity(cell).await;
        self.handle.set_current_identity(Some(identity.clone()));
        identity
    }

    fn skip(&self, identity: &str, reason: &str) {
        self.handle.add_skipped();
        self.journal.record(identity, ActionOutcome::Skipped, reason);
    }

    /// Drive one actionable cell: into view, settle, activate, then wait for
    /// the confirmation dialog. `Ok(true)` means confirmed, `Ok(false)` means
    /// the dialog never appeared (presumed success).
    async fn act(&self, control: &dyn DomNode, page: &dyn PageDom) -> Result<bool, DomError> {
        control.scroll_into_view().await?;
        tokio::time::sleep(self.opts.settle_delay).await;
        control.activate().await?;

        let waiter = ConfirmationWaiter {
            poll_interval: self.opts.confirm_poll,
            timeout: self.opts.confirm_timeout,
        };
        match waiter.wait(page, &self.keywords).await? {
            Some(confirm) => {
                confirm.activate().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Suspend at the iteration boundary while paused. A stop intent ends
    /// the suspension; the caller re-checks it immediately after.
    async fn wait_while_paused(&self) {
        if !self.handle.is_paused() || self.handle.stop_requested() {
            return;
        }
        self.handle.set_status(SessionStatus::Paused);
        info!("session paused");
        while self.handle.is_paused() && !self.handle.stop_requested() {
            tokio::time::sleep(self.opts.pause_poll).await;
        }
        if !self.handle.stop_requested() {
            self.handle.set_status(SessionStatus::Running);
            info!("session resumed");
        }
    }

    fn finish(self, cause: StopCause) -> Result<SessionReport, DomError> {
        self.handle.set_status(SessionStatus::Stopped(cause));
        self.handle.set_current_identity(None);
        let report = SessionReport {
            session_id: self.session_id,
            started_at: self.started_at,
            finished_at: Utc::now().to_rfc3339(),
            processed: self.handle.processed(),
            skipped: self.handle.skipped(),
            stop_cause: cause,
            entries: self.journal.entries(),
        };
        info!(
            "sweep session {} finished: {} unfollowed, {} skipped ({:?})",
            self.session_id, report.processed, report.skipped, cause
        );
        Ok(report)
    }
}
