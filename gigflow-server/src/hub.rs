//! Broadcast hub for real-time outcome notifications.
//!
//! One broadcast topic, every event to every subscriber: each connected
//! WebSocket client receives the full stream and discards events not
//! addressed to its own identity. Per-recipient topics would let the
//! transport enforce delivery scoping, but the payload here is just gig
//! id/title/outcome, so the simpler protocol wins.

use std::fmt;

use tokio::sync::broadcast;

use gigflow_core::NotificationPublisher;
use gigflow_model::NotificationEvent;

const CHANNEL_CAPACITY: usize = 1024;

/// Fan-out channel between the hiring engine and WebSocket connections.
#[derive(Clone)]
pub struct NotificationHub {
    broadcast: broadcast::Sender<NotificationEvent>,
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("subscribers", &self.broadcast.receiver_count())
            .finish()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { broadcast: tx }
    }

    /// Subscribe to the event stream. Each subscriber sees every event
    /// published after the call.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.broadcast.subscribe()
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.broadcast.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationPublisher for NotificationHub {
    fn publish(&self, event: NotificationEvent) {
        // At-most-once, best-effort: a send with no subscribers is normal.
        let _ = self.broadcast.send(event);
    }
}
