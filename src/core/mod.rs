pub mod config;
pub mod guard;
pub mod types;

pub use config::{load_config, SweepConfig};
pub use guard::{EngineError, SessionGuard};
pub use types::{
    ActionOutcome, LogEntry, PanelView, SessionReport, SessionStatus, Settings, StopCause,
};
