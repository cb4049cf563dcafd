//! Single-bid rejection under ownership and gig-state guards.

use std::sync::Arc;

use gigflow_model::{Bid, BidId, NotificationEvent, UserId};
use tracing::info;

use crate::error::{MarketError, Result};
use crate::notify::NotificationPublisher;
use crate::store::MarketStore;

/// Rejects individual bids on behalf of the gig owner.
///
/// Independent per bid; no multi-record transaction. The store re-checks the
/// gig's openness at write time, so a reject racing a concurrent hire fails
/// with [`MarketError::GigClosed`] instead of mutating an assigned gig's bid.
pub struct BidRejection {
    store: Arc<dyn MarketStore>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl std::fmt::Debug for BidRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BidRejection").finish_non_exhaustive()
    }
}

impl BidRejection {
    pub fn new(store: Arc<dyn MarketStore>, publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self { store, publisher }
    }

    /// Rejects `bid_id` on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// - [`MarketError::BidNotFound`] / [`MarketError::GigNotFound`]
    /// - [`MarketError::Forbidden`] if the caller does not own the gig
    /// - [`MarketError::GigClosed`] if the gig is no longer open
    /// - [`MarketError::BidNotPending`] if the bid was already decided
    pub async fn reject(&self, bid_id: BidId, caller: UserId) -> Result<Bid> {
        let bid = self
            .store
            .get_bid(bid_id)
            .await?
            .ok_or(MarketError::BidNotFound { bid_id })?;
        let gig = self
            .store
            .get_gig(bid.gig_id)
            .await?
            .ok_or(MarketError::GigNotFound { gig_id: bid.gig_id })?;

        if !gig.is_owned_by(caller) {
            return Err(MarketError::Forbidden);
        }
        if !gig.is_open() {
            return Err(MarketError::GigClosed);
        }
        if !bid.is_pending() {
            return Err(MarketError::BidNotPending);
        }

        let rejected = self.store.reject_bid(bid_id).await?;

        info!(bid_id = %bid_id, gig_id = %gig.id, "bid rejected");
        self.publisher.publish(NotificationEvent::bid_rejected(
            rejected.responder_id,
            gig.id,
            &gig.title,
        ));
        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingPublisher;
    use crate::store::memory::MemoryStore;
    use gigflow_model::{BidDraft, BidStatus, GigDraft, NotificationKind};

    async fn setup() -> (
        Arc<MemoryStore>,
        Arc<RecordingPublisher>,
        BidRejection,
        UserId,
        Bid,
    ) {
        let store = Arc::new(MemoryStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let owner = UserId::new();
        let gig = GigDraft::new("Test Gig", "desc", 500)
            .unwrap()
            .into_gig(owner);
        store.insert_gig(&gig).await.unwrap();
        let bid = BidDraft::new(450, "pick me")
            .unwrap()
            .into_bid(gig.id, UserId::new());
        store.insert_bid(&bid).await.unwrap();
        let service = BidRejection::new(store.clone(), publisher.clone());
        (store, publisher, service, owner, bid)
    }

    #[tokio::test]
    async fn owner_can_reject_a_pending_bid() {
        let (_, publisher, service, owner, bid) = setup().await;
        let rejected = service.reject(bid.id, owner).await.unwrap();
        assert_eq!(rejected.status, BidStatus::Rejected);

        let events = publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, NotificationKind::BidRejected);
        assert_eq!(events[0].user_id, bid.responder_id);
    }

    #[tokio::test]
    async fn stranger_cannot_reject() {
        let (_, publisher, service, _, bid) = setup().await;
        let err = service.reject(bid.id, UserId::new()).await.unwrap_err();
        assert!(matches!(err, MarketError::Forbidden));
        assert!(publisher.events().is_empty());
    }

    #[tokio::test]
    async fn rejecting_twice_fails() {
        let (_, _, service, owner, bid) = setup().await;
        service.reject(bid.id, owner).await.unwrap();
        let err = service.reject(bid.id, owner).await.unwrap_err();
        assert!(matches!(err, MarketError::BidNotPending));
    }
}
