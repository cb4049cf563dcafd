//! # GigFlow Model
//!
//! Shared domain types for the GigFlow marketplace: typed identifiers,
//! the `Gig` and `Bid` entities with their status machines, user accounts,
//! and the notification events emitted when a hiring decision lands.
//!
//! This crate is deliberately free of storage and transport concerns so the
//! same types can cross the HTTP, WebSocket, and persistence boundaries.

pub mod bid;
pub mod events;
pub mod gig;
pub mod ids;
pub mod user;

pub use bid::{Bid, BidDraft, BidStatus};
pub use events::{NotificationEvent, NotificationKind};
pub use gig::{Gig, GigDraft, GigStatus};
pub use ids::{BidId, GigId, UserId};
pub use user::User;

/// Validation failure for user-supplied entity fields.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{field} is required")]
    MissingField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A monetary amount was zero or negative.
    #[error("{field} must be positive")]
    NonPositiveAmount {
        /// Name of the offending field.
        field: &'static str,
    },
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn require_positive(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveAmount { field });
    }
    Ok(value)
}
