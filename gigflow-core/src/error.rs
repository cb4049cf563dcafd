//! Error taxonomy for the hiring engine.
//!
//! Most variants are business outcomes, not faults: a gig closing under a
//! caller's feet is the normal result of losing a race. Only
//! [`MarketError::Storage`] represents an actual failure, and
//! [`MarketError::TransactionConflict`] never crosses the service boundary —
//! the hiring orchestrator reclassifies it before returning.

use gigflow_model::{BidId, GigId};

/// The result type used throughout gigflow-core.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors produced by marketplace operations.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// The referenced gig does not exist.
    #[error("gig not found: {gig_id}")]
    GigNotFound {
        /// The gig ID that was not found.
        gig_id: GigId,
    },

    /// The referenced bid does not exist.
    #[error("bid not found: {bid_id}")]
    BidNotFound {
        /// The bid ID that was not found.
        bid_id: BidId,
    },

    /// The caller is not the owner of the gig.
    #[error("caller is not the gig owner")]
    Forbidden,

    /// The gig is no longer open for bidding or rejection.
    #[error("gig is no longer open")]
    GigClosed,

    /// The gig was assigned before this hire attempt could commit.
    #[error("gig has already been assigned")]
    AlreadyClosed,

    /// The bid has already been decided.
    #[error("bid is no longer pending")]
    BidNotPending,

    /// The responder already has a bid on this gig.
    #[error("responder has already bid on this gig")]
    DuplicateBid,

    /// A unique constraint unrelated to bidding was violated.
    #[error("{0}")]
    Conflict(String),

    /// Invalid user-supplied input.
    #[error(transparent)]
    Validation(#[from] gigflow_model::ValidationError),

    /// Another transaction won a write-write conflict on the same records.
    ///
    /// Internal to the store/orchestrator pair; callers see
    /// [`MarketError::AlreadyClosed`] instead.
    #[error("write conflict: a concurrent transaction committed first")]
    TransactionConflict,

    /// A storage operation failed. Safe for the caller to retry.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MarketError {
    /// Creates a new storage error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new storage error with a source.
    #[must_use]
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for outcomes the caller caused or can reason about, as opposed
    /// to infrastructure faults.
    #[must_use]
    pub fn is_business_outcome(&self) -> bool {
        !matches!(self, Self::Storage { .. } | Self::TransactionConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn not_found_display_names_the_id() {
        let gig_id = GigId::new();
        let err = MarketError::GigNotFound { gig_id };
        assert!(err.to_string().contains(&gig_id.to_string()));
    }

    #[test]
    fn storage_error_keeps_source() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = MarketError::storage_with_source("pool exhausted", source);
        assert!(err.to_string().contains("storage error"));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn conflict_variants_are_not_business_outcomes() {
        assert!(!MarketError::TransactionConflict.is_business_outcome());
        assert!(!MarketError::storage("down").is_business_outcome());
        assert!(MarketError::AlreadyClosed.is_business_outcome());
        assert!(MarketError::DuplicateBid.is_business_outcome());
    }
}
