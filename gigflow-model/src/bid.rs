//! The bid entity: a responder's offer against a specific gig.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BidId, GigId, UserId};
use crate::{ValidationError, require_positive, require_text};

/// Lifecycle state of a bid.
///
/// A bid leaves `Pending` at most once; `Hired` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    /// Awaiting a decision from the gig owner.
    Pending,
    /// Accepted. At most one bid per gig ever reaches this state.
    Hired,
    /// Declined, either individually or as a losing bid during a hire.
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BidStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "hired" => Ok(Self::Hired),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown bid status: {other}")),
        }
    }
}

/// A responder's offer for a gig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    /// The gig this bid targets. Immutable.
    pub gig_id: GigId,
    /// Identity of the responder who placed the bid. Immutable.
    pub responder_id: UserId,
    /// Offered price in whole currency units. Carried opaquely.
    pub price: i64,
    pub message: String,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

impl Bid {
    pub fn is_pending(&self) -> bool {
        self.status == BidStatus::Pending
    }
}

/// Validated input for submitting a bid.
#[derive(Debug, Clone)]
pub struct BidDraft {
    pub price: i64,
    pub message: String,
}

impl BidDraft {
    pub fn new(price: i64, message: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            price: require_positive("price", price)?,
            message: require_text("message", message)?,
        })
    }

    /// Materializes the draft into a pending bid by `responder_id` on `gig_id`.
    pub fn into_bid(self, gig_id: GigId, responder_id: UserId) -> Bid {
        Bid {
            id: BidId::new(),
            gig_id,
            responder_id,
            price: self.price,
            message: self.message,
            status: BidStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bid_is_pending() {
        let bid = BidDraft::new(450, "I can do this!")
            .unwrap()
            .into_bid(GigId::new(), UserId::new());
        assert!(bid.is_pending());
        assert!(!bid.status.is_terminal());
    }

    #[test]
    fn terminal_states() {
        assert!(BidStatus::Hired.is_terminal());
        assert!(BidStatus::Rejected.is_terminal());
        assert!(!BidStatus::Pending.is_terminal());
    }

    #[test]
    fn draft_rejects_bad_input() {
        assert!(BidDraft::new(0, "hi").is_err());
        assert!(BidDraft::new(10, "   ").is_err());
    }
}
