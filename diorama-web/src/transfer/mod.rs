//! Transfer module - grab-and-hold trigger, notifications, backend contract
//!
//! Re-exports only. All logic in submodules.

mod backend;
mod grab;
mod notify;

pub use backend::{run_transfer, TransferBackend, TransferError, TransferOutcome};
pub use grab::{GrabTransferMachine, TransferConfig, TransferMode, TransferState, GRAB_HOLD_MS};
pub use notify::{
    Notification, NotificationCategory, NotificationSink, Notifier, RateLimiter, ThrottleConfig,
};

#[cfg(test)]
pub(crate) use backend::mock;
