//! Notification events broadcast to connected clients.
//!
//! Every connected client receives every event and keeps only those whose
//! `user_id` matches its own authenticated identity. The payload is limited
//! to the gig id, title, and outcome text, so the broadcast-then-filter
//! model leaks nothing sensitive.

use serde::{Deserialize, Serialize};

use crate::ids::{GigId, UserId};

/// Outcome kinds emitted by the hiring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Hired,
    BidRejected,
}

/// A single outcome notification addressed to one responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// The responder this event is addressed to. Clients discard events for
    /// other identities.
    pub user_id: UserId,
    /// Human-readable outcome line for direct rendering.
    pub message: String,
    pub gig_id: GigId,
    pub gig_title: String,
}

impl NotificationEvent {
    /// The event sent to the winning responder after a hire commits.
    pub fn hired(user_id: UserId, gig_id: GigId, gig_title: &str) -> Self {
        Self {
            kind: NotificationKind::Hired,
            user_id,
            message: format!("You have been hired for {gig_title}!"),
            gig_id,
            gig_title: gig_title.to_string(),
        }
    }

    /// The event sent to a responder whose bid was rejected, either
    /// explicitly or as a losing bid during a hire.
    pub fn bid_rejected(user_id: UserId, gig_id: GigId, gig_title: &str) -> Self {
        Self {
            kind: NotificationKind::BidRejected,
            user_id,
            message: format!("Your bid for {gig_title} was rejected."),
            gig_id,
            gig_title: gig_title.to_string(),
        }
    }
}
