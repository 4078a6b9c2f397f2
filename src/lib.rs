pub mod audit;
pub mod classify;
pub mod core;
pub mod dom;
pub mod session;

// --- Primary core exports ---
pub use core::guard::{EngineError, SessionGuard};
pub use core::types;
pub use core::types::{
    ActionOutcome, LogEntry, PanelView, SessionReport, SessionStatus, Settings, StopCause,
};
pub use core::{load_config, SweepConfig};

// --- Heuristics & DOM surface ---
pub use audit::{audit_html, audit_page, AuditReport};
pub use classify::{Classification, KeywordSet};
pub use dom::{DescendantQuery, DomError, DomNode, PageDom};

// --- Session surface ---
pub use session::{ActionDelay, ConfirmationWaiter, SessionHandle, SweepOptions, SweepSession};
