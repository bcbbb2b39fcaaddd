// ABOUTME: User-facing event notification with explicit observer registration
// ABOUTME: Broadcast-channel implementation plus a silent no-op for headless use
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Workout event notifications.
//!
//! The tracker never blocks on a notification: events are fire-and-forget
//! signals a UI layer can subscribe to (toasts, celebration screens). The
//! notifier is passed into the core components explicitly; there is no
//! ambient global event bus.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events surfaced to the user during a workout session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkoutEvent {
    /// Remote progress sync exhausted its retries; local copy is intact
    SyncFailed {
        /// Owning user
        user_id: Uuid,
        /// Day being trained
        day: String,
        /// User-facing message ("saved locally, not yet synced")
        message: String,
    },
    /// A set met or exceeded the exercise's goal weight
    GoalAchieved {
        /// Exercise the goal belongs to
        exercise: String,
        /// Weight that crossed the threshold
        weight: f64,
        /// The goal weight
        target: f64,
        /// Days until the target date; negative when past it
        days_remaining: Option<i64>,
    },
    /// The finished session was durably recorded
    SessionSaved {
        /// Recorder-assigned session id
        session_id: Uuid,
    },
    /// Recording the finished session failed; progress is retained for retry
    SessionSaveFailed {
        /// User-facing failure description
        message: String,
    },
}

/// Observer for workout events.
///
/// Implementations must be cheap and non-blocking; they run inline with
/// tracker state transitions.
pub trait WorkoutNotifier: Send + Sync {
    /// Deliver one event
    fn notify(&self, event: WorkoutEvent);
}

/// Notifier that forwards events to any number of broadcast subscribers
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<WorkoutEvent>,
}

impl BroadcastNotifier {
    /// Create a notifier with the given channel capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to future events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WorkoutEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl WorkoutNotifier for BroadcastNotifier {
    fn notify(&self, event: WorkoutEvent) {
        // No subscribers is fine; events are advisory
        if self.sender.send(event).is_err() {
            tracing::debug!("workout event dropped: no subscribers");
        }
    }
}

/// Notifier that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl WorkoutNotifier for NullNotifier {
    fn notify(&self, _event: WorkoutEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events() {
        let notifier = BroadcastNotifier::default();
        let mut rx = notifier.subscribe();

        notifier.notify(WorkoutEvent::SessionSaveFailed {
            message: "boom".to_owned(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, WorkoutEvent::SessionSaveFailed { .. }));
    }

    #[test]
    fn notify_without_subscribers_is_silent() {
        let notifier = BroadcastNotifier::default();
        notifier.notify(WorkoutEvent::SyncFailed {
            user_id: Uuid::new_v4(),
            day: "monday".to_owned(),
            message: "saved locally, not yet synced".to_owned(),
        });
    }
}
