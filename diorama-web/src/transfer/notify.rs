//! User-facing status notifications and their throttling

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::grab::TransferMode;

/// Status event categories, in the wire spelling the UI listens for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationCategory {
    HandTrackingStart,
    HandTrackingStop,
    TransferPreparing,
    TransferProgress,
    TransferCancelled,
    TransferComplete,
    TransferFailed,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandTrackingStart => "hand-tracking-start",
            Self::HandTrackingStop => "hand-tracking-stop",
            Self::TransferPreparing => "transfer-preparing",
            Self::TransferProgress => "transfer-progress",
            Self::TransferCancelled => "transfer-cancelled",
            Self::TransferComplete => "transfer-complete",
            Self::TransferFailed => "transfer-failed",
        }
    }
}

/// Fire-and-forget status event
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub category: NotificationCategory,
    pub message: String,
    pub mode: Option<TransferMode>,
}

impl Notification {
    pub fn new(category: NotificationCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Receiver of status events. Consumers may drop or throttle freely.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Minimum spacing between two events of the same key
#[derive(Clone, Debug)]
pub struct RateLimiter<K> {
    intervals_ms: HashMap<K, f64>,
    default_interval_ms: f64,
    last_ms: HashMap<K, f64>,
}

impl<K: Copy + Eq + Hash> RateLimiter<K> {
    pub fn new(default_interval_ms: f64) -> Self {
        Self {
            intervals_ms: HashMap::new(),
            default_interval_ms,
            last_ms: HashMap::new(),
        }
    }

    pub fn with_interval(mut self, key: K, interval_ms: f64) -> Self {
        self.intervals_ms.insert(key, interval_ms);
        self
    }

    fn interval(&self, key: K) -> f64 {
        self.intervals_ms
            .get(&key)
            .copied()
            .unwrap_or(self.default_interval_ms)
    }

    /// True (and records `now_ms`) if `key` has been quiet for its interval
    pub fn allow(&mut self, key: K, now_ms: f64) -> bool {
        if let Some(&last) = self.last_ms.get(&key) {
            if now_ms - last < self.interval(key) {
                return false;
            }
        }
        self.last_ms.insert(key, now_ms);
        true
    }

    /// Mark `key` as just emitted without emitting
    pub fn touch(&mut self, key: K, now_ms: f64) {
        self.last_ms.insert(key, now_ms);
    }

    pub fn clear(&mut self) {
        self.last_ms.clear();
    }
}

/// Per-category minimum intervals (ms)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub preparing_ms: f64,
    pub progress_ms: f64,
    pub cancelled_ms: f64,
    pub complete_ms: f64,
    pub failed_ms: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            preparing_ms: 1000.0,
            progress_ms: 1000.0,
            cancelled_ms: 1500.0,
            complete_ms: 1000.0,
            failed_ms: 0.0,
        }
    }
}

impl ThrottleConfig {
    pub fn limiter(&self) -> RateLimiter<NotificationCategory> {
        use NotificationCategory::*;
        RateLimiter::new(0.0)
            .with_interval(TransferPreparing, self.preparing_ms)
            .with_interval(TransferProgress, self.progress_ms)
            .with_interval(TransferCancelled, self.cancelled_ms)
            .with_interval(TransferComplete, self.complete_ms)
            .with_interval(TransferFailed, self.failed_ms)
    }
}

/// Throttled emitter owned by the component producing the events
#[derive(Clone, Debug)]
pub struct Notifier {
    limiter: RateLimiter<NotificationCategory>,
}

impl Notifier {
    pub fn new(throttle: &ThrottleConfig) -> Self {
        Self {
            limiter: throttle.limiter(),
        }
    }

    /// Forward to `sink` unless the category is still cooling down
    pub fn emit(
        &mut self,
        sink: &mut dyn NotificationSink,
        notification: Notification,
        now_ms: f64,
    ) {
        if !self.limiter.allow(notification.category, now_ms) {
            log::debug!("Throttled {} notification", notification.category.as_str());
            return;
        }
        sink.notify(notification);
    }

    pub fn touch(&mut self, category: NotificationCategory, now_ms: f64) {
        self.limiter.touch(category, now_ms);
    }
}
