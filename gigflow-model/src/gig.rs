//! The gig entity: a task posted by a requester, open for bidding until
//! assigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GigId, UserId};
use crate::{ValidationError, require_positive, require_text};

/// Lifecycle state of a gig.
///
/// The transition is monotonic: `Open` becomes `Assigned` exactly once and is
/// never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigStatus {
    /// Accepting new bids.
    Open,
    /// One bid has been hired; the gig is closed to all further changes.
    Assigned,
}

impl GigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
        }
    }
}

impl std::fmt::Display for GigStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GigStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "assigned" => Ok(Self::Assigned),
            other => Err(format!("unknown gig status: {other}")),
        }
    }
}

/// A posted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gig {
    pub id: GigId,
    /// Identity of the requester who posted the gig. Immutable.
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    /// Budget in whole currency units. Carried opaquely.
    pub budget: i64,
    pub status: GigStatus,
    pub created_at: DateTime<Utc>,
}

impl Gig {
    pub fn is_open(&self) -> bool {
        self.status == GigStatus::Open
    }

    /// True when `caller` posted this gig.
    pub fn is_owned_by(&self, caller: UserId) -> bool {
        self.owner_id == caller
    }
}

/// Validated input for posting a new gig.
#[derive(Debug, Clone)]
pub struct GigDraft {
    pub title: String,
    pub description: String,
    pub budget: i64,
}

impl GigDraft {
    /// Validates the user-supplied fields.
    pub fn new(title: &str, description: &str, budget: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            title: require_text("title", title)?,
            description: require_text("description", description)?,
            budget: require_positive("budget", budget)?,
        })
    }

    /// Materializes the draft into an open gig owned by `owner_id`.
    pub fn into_gig(self, owner_id: UserId) -> Gig {
        Gig {
            id: GigId::new(),
            owner_id,
            title: self.title,
            description: self.description,
            budget: self.budget,
            status: GigStatus::Open,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_trims_and_validates() {
        let draft = GigDraft::new("  Build a site  ", "Landing page", 500).unwrap();
        assert_eq!(draft.title, "Build a site");

        assert!(GigDraft::new("", "desc", 500).is_err());
        assert!(GigDraft::new("title", "desc", 0).is_err());
        assert!(GigDraft::new("title", "desc", -3).is_err());
    }

    #[test]
    fn new_gig_starts_open_and_owned() {
        let owner = UserId::new();
        let gig = GigDraft::new("t", "d", 100).unwrap().into_gig(owner);
        assert!(gig.is_open());
        assert!(gig.is_owned_by(owner));
        assert!(!gig.is_owned_by(UserId::new()));
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&GigStatus::Assigned).unwrap(),
            "\"assigned\""
        );
        assert_eq!("open".parse::<GigStatus>().unwrap(), GigStatus::Open);
        assert!("closed".parse::<GigStatus>().is_err());
    }
}
