//! Bid intake: validates and records a new bid against an open gig.

use std::sync::Arc;

use gigflow_model::{Bid, BidDraft, GigId, UserId};
use tracing::info;

use crate::error::{MarketError, Result};
use crate::store::MarketStore;

/// Records new bids, enforcing one bid per responder per gig.
///
/// Submissions from different responders commute, so no cross-record
/// transaction is needed: the store's conditional insert and uniqueness
/// constraint carry the whole correctness burden.
pub struct BidIntake {
    store: Arc<dyn MarketStore>,
}

impl std::fmt::Debug for BidIntake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BidIntake").finish_non_exhaustive()
    }
}

impl BidIntake {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Submits a bid by `responder` against `gig_id`.
    ///
    /// # Errors
    ///
    /// - [`MarketError::Validation`] for empty messages or non-positive prices
    /// - [`MarketError::GigNotFound`] if the gig does not exist
    /// - [`MarketError::GigClosed`] if the gig is no longer open
    /// - [`MarketError::DuplicateBid`] if the responder already bid on it
    pub async fn submit_bid(
        &self,
        gig_id: GigId,
        responder: UserId,
        price: i64,
        message: &str,
    ) -> Result<Bid> {
        let draft = BidDraft::new(price, message)?;

        let gig = self
            .store
            .get_gig(gig_id)
            .await?
            .ok_or(MarketError::GigNotFound { gig_id })?;
        if !gig.is_open() {
            return Err(MarketError::GigClosed);
        }
        if self
            .store
            .find_bid_by_responder(gig_id, responder)
            .await?
            .is_some()
        {
            return Err(MarketError::DuplicateBid);
        }

        // The insert re-checks openness and uniqueness at write time; the
        // reads above only exist to classify the common failures early.
        let bid = draft.into_bid(gig_id, responder);
        self.store.insert_bid(&bid).await?;

        info!(bid_id = %bid.id, gig_id = %gig_id, responder = %responder, "bid submitted");
        Ok(bid)
    }
}
