//! Shared session state and the control-panel interface.
//!
//! The panel never calls engine algorithms. It holds an
//! `Arc<SessionHandle>`, toggles intents and settings through it, and reads
//! the [`PanelView`] projection back; the loop polls the same handle fresh
//! at every suspension boundary. One writer per field per boundary, so plain
//! atomics and short-lived locks are all the discipline required.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use crate::core::types::{PanelView, SessionStatus, Settings};

#[derive(Debug)]
pub struct SessionHandle {
    paused: AtomicBool,
    stop: AtomicBool,
    processed: AtomicU32,
    skipped: AtomicU32,
    status: RwLock<SessionStatus>,
    current_identity: RwLock<Option<String>>,
    settings: RwLock<Settings>,
}

impl SessionHandle {
    pub(crate) fn new(settings: Settings) -> Arc<Self> {
        Arc::new(Self {
            paused: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            processed: AtomicU32::new(0),
            skipped: AtomicU32::new(0),
            status: RwLock::new(SessionStatus::Running),
            current_identity: RwLock::new(None),
            settings: RwLock::new(settings),
        })
    }

    // ── Panel intents ────────────────────────────────────────────────────

    pub fn request_pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn request_resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Replace the live settings; the loop picks the change up at its next
    /// boundary.
    pub fn update_settings(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings.write().unwrap());
    }

    // ── Loop-side queries ────────────────────────────────────────────────

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn settings(&self) -> Settings {
        *self.settings.read().unwrap()
    }

    pub fn processed(&self) -> u32 {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn skipped(&self) -> u32 {
        self.skipped.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.read().unwrap()
    }

    // ── Loop-side mutators ───────────────────────────────────────────────

    pub(crate) fn add_processed(&self) -> u32 {
        self.processed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn add_skipped(&self) -> u32 {
        self.skipped.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn set_status(&self, status: SessionStatus) {
        *self.status.write().unwrap() = status;
    }

    pub(crate) fn set_current_identity(&self, identity: Option<String>) {
        *self.current_identity.write().unwrap() = identity;
    }

    // ── Panel projection ─────────────────────────────────────────────────

    pub fn view(&self) -> PanelView {
        let settings = self.settings();
        let processed = self.processed();
        let max = settings.max_actions.max(1);
        let percent = ((processed.min(max) as u64 * 100) / max as u64) as u8;
        PanelView {
            processed,
            skipped: self.skipped(),
            remaining: settings.max_actions.saturating_sub(processed),
            percent_complete: percent,
            current_identity: self.current_identity.read().unwrap().clone(),
            status: self.status().label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_round_trip() {
        let handle = SessionHandle::new(Settings::default());
        assert!(!handle.is_paused());
        handle.request_pause();
        assert!(handle.is_paused());
        handle.request_resume();
        assert!(!handle.is_paused());
        assert!(!handle.stop_requested());
        handle.request_stop();
        assert!(handle.stop_requested());
    }

    #[test]
    fn test_settings_edit_is_visible_on_next_read() {
        let handle = SessionHandle::new(Settings::default());
        handle.update_settings(|s| {
            s.max_actions = 5;
            s.min_delay_ms = 100;
            s.max_delay_ms = 100;
        });
        let s = handle.settings();
        assert_eq!(s.max_actions, 5);
        assert_eq!(s.min_delay_ms, 100);
    }

    #[test]
    fn test_panel_view_projection() {
        let handle = SessionHandle::new(Settings {
            max_actions: 4,
            ..Settings::default()
        });
        handle.add_processed();
        handle.add_skipped();
        handle.set_current_identity(Some("johndoe".into()));

        let view = handle.view();
        assert_eq!(view.processed, 1);
        assert_eq!(view.skipped, 1);
        assert_eq!(view.remaining, 3);
        assert_eq!(view.percent_complete, 25);
        assert_eq!(view.current_identity.as_deref(), Some("johndoe"));
        assert_eq!(view.status, "running");
    }

    #[test]
    fn test_percent_clamps_at_full() {
        let handle = SessionHandle::new(Settings {
            max_actions: 1,
            ..Settings::default()
        });
        handle.add_processed();
        handle.add_processed();
        assert_eq!(handle.view().percent_complete, 100);
        assert_eq!(handle.view().remaining, 0);
    }
}
