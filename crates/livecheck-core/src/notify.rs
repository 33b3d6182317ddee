//! Human-readable progress events for the host's notification surface.
//!
//! Notifications are informational only; nothing in the state machine
//! depends on them being delivered.

use std::fmt;
use std::sync::Mutex;

use crate::steps::{Step, TurnDirection};

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    StepStarted(Step),
    FaceAligned,
    TurnDetected(TurnDirection),
    BlinkDetected { count: u32, required: u32 },
    SmileDetected,
    Completed,
    Cancelled,
    CameraUnavailable(String),
    ModelLoadFailed(String),
}

impl Notification {
    /// Whether this notification reports a failure rather than progress.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notification::CameraUnavailable(_) | Notification::ModelLoadFailed(_)
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::StepStarted(step) => {
                write!(f, "Step {} of {}: {}", step.number(), Step::COUNT, step.instruction())
            }
            Notification::FaceAligned => f.write_str("Face aligned!"),
            Notification::TurnDetected(TurnDirection::Right) => f.write_str("Right turn detected!"),
            Notification::TurnDetected(TurnDirection::Left) => f.write_str("Left turn detected!"),
            Notification::BlinkDetected { count, required } => {
                write!(f, "Blink detected! ({count}/{required})")
            }
            Notification::SmileDetected => f.write_str("Smile detected!"),
            Notification::Completed => f.write_str("Liveness check complete"),
            Notification::Cancelled => f.write_str("Liveness check cancelled"),
            Notification::CameraUnavailable(_) => f.write_str("Unable to access camera"),
            Notification::ModelLoadFailed(_) => {
                f.write_str("Error loading face detection models")
            }
        }
    }
}

/// Receives progress and failure notifications from a session.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Forwards notifications to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        if notification.is_error() {
            tracing::error!(?notification, "{notification}");
        } else {
            tracing::info!("{notification}");
        }
    }
}

/// Keeps every notification in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification.clone());
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification)
    }
}
