//! Outbound publisher seam for real-time notification fan-out.
//!
//! The engine emits events strictly after the corresponding store
//! transaction is durable. Delivery is at-most-once, best-effort: a send
//! with no connected subscribers is not an error.

use gigflow_model::NotificationEvent;

/// A sink for hiring-outcome events.
///
/// Implementations must be cheap and non-blocking; the orchestrator calls
/// `publish` on the request path immediately after commit.
pub trait NotificationPublisher: Send + Sync {
    /// Publishes one event to the broadcast transport.
    fn publish(&self, event: NotificationEvent);
}

/// Publisher that drops every event. Useful when fan-out is not wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl NotificationPublisher for NoopPublisher {
    fn publish(&self, _event: NotificationEvent) {}
}

/// In-memory publisher that records events in order. Test helper.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: std::sync::Mutex<Vec<NotificationEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all events published so far, in publish order.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(&self, event: NotificationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
