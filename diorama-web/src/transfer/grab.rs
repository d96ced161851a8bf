//! Grab-and-hold transfer trigger
//!
//! Open palm, then a fist held for two seconds, fires one send or receive.
//! The open palm arms the gesture and also cancels any hold in progress.
//! After a fire the palm must be shown again before the next transfer.

use serde::{Deserialize, Serialize};

use super::backend::{TransferError, TransferOutcome};
use super::notify::{Notification, NotificationCategory, NotificationSink, Notifier, ThrottleConfig};

/// How long the fist must be held before a transfer fires
pub const GRAB_HOLD_MS: f64 = 2000.0;

/// Which way a completed grab moves the model
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Send,
    Receive,
}

impl TransferMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferMode::Send => "send",
            TransferMode::Receive => "receive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "send" => Some(TransferMode::Send),
            "receive" => Some(TransferMode::Receive),
            _ => None,
        }
    }
}

/// Whether a transfer is in flight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransferState {
    #[default]
    Idle,
    Sending,
    Receiving,
}

impl TransferState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Idle => "idle",
            TransferState::Sending => "sending",
            TransferState::Receiving => "receiving",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub mode: TransferMode,
    pub hold_ms: f64,
    pub throttle: ThrottleConfig,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            mode: TransferMode::Send,
            hold_ms: GRAB_HOLD_MS,
            throttle: ThrottleConfig::default(),
        }
    }
}

/// Grab/transfer state machine, one per tracking session
#[derive(Debug)]
pub struct GrabTransferMachine {
    mode: TransferMode,
    hold_ms: f64,
    state: TransferState,
    /// Set only while an armed grab is being held
    grab_start_ms: Option<f64>,
    was_open_palm: bool,
    /// Set when a transfer fires; only an open palm clears it
    needs_palm: bool,
    notifier: Notifier,
}

impl GrabTransferMachine {
    pub fn new(config: &TransferConfig) -> Self {
        Self {
            mode: config.mode,
            hold_ms: config.hold_ms,
            state: TransferState::Idle,
            grab_start_ms: None,
            was_open_palm: false,
            needs_palm: false,
            notifier: Notifier::new(&config.throttle),
        }
    }

    /// Feed one frame's pose summary. Returns the mode to run when a hold completes.
    pub fn update(
        &mut self,
        open_palm: bool,
        grab: bool,
        now_ms: f64,
        sink: &mut dyn NotificationSink,
    ) -> Option<TransferMode> {
        // One transfer at a time
        if self.state != TransferState::Idle {
            return None;
        }

        if open_palm {
            self.was_open_palm = true;
            self.needs_palm = false;
            if self.grab_start_ms.take().is_some() {
                self.emit(sink, NotificationCategory::TransferCancelled, "Transfer reset", now_ms);
            }
            return None;
        }

        if !grab {
            if self.grab_start_ms.take().is_some() {
                self.emit(
                    sink,
                    NotificationCategory::TransferCancelled,
                    "Grab released, transfer cancelled",
                    now_ms,
                );
            }
            return None;
        }

        if self.needs_palm {
            return None;
        }

        if !self.was_open_palm {
            // Absorb the first grab frame after any non-palm state
            self.was_open_palm = true;
            return None;
        }

        let Some(start) = self.grab_start_ms else {
            self.grab_start_ms = Some(now_ms);
            let message = format!("Hold to {}...", self.mode.as_str());
            self.emit(sink, NotificationCategory::TransferPreparing, &message, now_ms);
            self.notifier.touch(NotificationCategory::TransferProgress, now_ms);
            return None;
        };

        let elapsed = now_ms - start;
        if elapsed >= self.hold_ms {
            self.grab_start_ms = None;
            self.was_open_palm = false;
            self.needs_palm = true;
            self.state = match self.mode {
                TransferMode::Send => TransferState::Sending,
                TransferMode::Receive => TransferState::Receiving,
            };
            log::info!("Grab held for {:.0}ms, starting {}", elapsed, self.mode.as_str());
            return Some(self.mode);
        }

        let remaining = ((self.hold_ms - elapsed) / 1000.0).ceil();
        let message = format!("Keep holding to {}... {}s", self.mode.as_str(), remaining);
        self.emit(sink, NotificationCategory::TransferProgress, &message, now_ms);
        None
    }

    /// Report the result of the transfer started by the last fire
    pub fn finish(
        &mut self,
        result: Result<TransferOutcome, TransferError>,
        now_ms: f64,
        sink: &mut dyn NotificationSink,
    ) {
        if self.state == TransferState::Idle {
            log::debug!("Transfer result arrived while idle, ignoring");
            return;
        }
        self.state = TransferState::Idle;

        match result {
            Ok(outcome) => {
                log::info!("Transfer complete: {}", outcome);
                self.emit(sink, NotificationCategory::TransferComplete, &outcome.to_string(), now_ms);
            }
            Err(err) => {
                log::error!("Transfer failed: {}", err);
                self.emit(sink, NotificationCategory::TransferFailed, &err.to_string(), now_ms);
            }
        }
    }

    fn emit(
        &mut self,
        sink: &mut dyn NotificationSink,
        category: NotificationCategory,
        message: &str,
        now_ms: f64,
    ) {
        let notification = Notification::new(category, message).with_mode(self.mode);
        self.notifier.emit(sink, notification, now_ms);
    }

    /// Change direction; ignored while a transfer is in flight
    pub fn set_mode(&mut self, mode: TransferMode) -> bool {
        if self.state != TransferState::Idle {
            return false;
        }
        self.mode = mode;
        true
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn is_holding(&self) -> bool {
        self.grab_start_ms.is_some()
    }

    pub fn was_open_palm(&self) -> bool {
        self.was_open_palm
    }

    /// True after a fire until an open palm is seen
    pub fn needs_palm(&self) -> bool {
        self.needs_palm
    }

    /// Milliseconds the current grab has been held
    pub fn hold_elapsed(&self, now_ms: f64) -> Option<f64> {
        self.grab_start_ms.map(|start| now_ms - start)
    }
}
