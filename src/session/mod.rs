pub mod confirm;
pub mod controller;
pub mod delay;
pub mod handle;
pub mod journal;

pub use confirm::ConfirmationWaiter;
pub use controller::{SweepOptions, SweepSession};
pub use delay::ActionDelay;
pub use handle::SessionHandle;
pub use journal::SessionJournal;
