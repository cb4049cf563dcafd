//! The hiring orchestrator: the atomic accept-one-reject-rest transition.

use std::sync::Arc;
use std::time::Duration;

use gigflow_model::{Bid, BidId, Gig, NotificationEvent, UserId};
use tracing::{debug, info, warn};

use crate::error::{MarketError, Result};
use crate::notify::NotificationPublisher;
use crate::store::MarketStore;

/// Default upper bound on the hire transaction, comfortably above the
/// store's own statement timeouts.
const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a successful hire.
#[derive(Debug, Clone)]
pub struct HireOutcome {
    /// The gig, now assigned.
    pub gig: Gig,
    /// The winning bid, now hired.
    pub bid: Bid,
}

/// Arbitrates concurrent hire attempts and finalizes gig and bid states.
///
/// For any set of concurrent `hire` calls racing on bids of the same gig,
/// exactly one caller observes success; the rest observe
/// [`MarketError::AlreadyClosed`] or [`MarketError::BidNotPending`]. Which
/// caller wins is first-committer-wins and deliberately unspecified.
pub struct HiringOrchestrator {
    store: Arc<dyn MarketStore>,
    publisher: Arc<dyn NotificationPublisher>,
    commit_timeout: Duration,
}

impl std::fmt::Debug for HiringOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HiringOrchestrator").finish_non_exhaustive()
    }
}

impl HiringOrchestrator {
    pub fn new(store: Arc<dyn MarketStore>, publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self {
            store,
            publisher,
            commit_timeout: DEFAULT_COMMIT_TIMEOUT,
        }
    }

    /// Overrides the bound on the hire transaction.
    #[must_use]
    pub fn with_commit_timeout(mut self, commit_timeout: Duration) -> Self {
        self.commit_timeout = commit_timeout;
        self
    }

    /// Hires the responder behind `bid_id` on behalf of `caller`.
    ///
    /// Loads the bid and its gig, authorizes the caller as the gig owner,
    /// then runs the store's hire transaction: gig `open → assigned`, target
    /// bid `pending → hired`, all sibling pending bids `pending → rejected`,
    /// committed together or not at all. Once the commit is durable, one
    /// `hired` event and one `bid_rejected` event per losing responder are
    /// published — never before.
    ///
    /// # Errors
    ///
    /// - [`MarketError::BidNotFound`] / [`MarketError::GigNotFound`]
    /// - [`MarketError::Forbidden`] if the caller does not own the gig
    /// - [`MarketError::AlreadyClosed`] if the gig was assigned first,
    ///   including when the loss is only discovered at commit time
    /// - [`MarketError::BidNotPending`] if the bid was already decided
    /// - [`MarketError::Storage`] if the transaction outlives its bound; the
    ///   caller may retry, and no events have been published
    pub async fn hire(&self, bid_id: BidId, caller: UserId) -> Result<HireOutcome> {
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
            return Err(MarketError::AlreadyClosed);
        }
        if !bid.is_pending() {
            return Err(MarketError::BidNotPending);
        }

        // Bounded: a hire must settle or fail within the window, never hang
        // the caller on a wedged competing transaction.
        let commit = tokio::time::timeout(
            self.commit_timeout,
            self.store.commit_hire(gig.id, bid_id),
        )
        .await
        .unwrap_or_else(|_| {
            warn!(gig_id = %gig.id, bid_id = %bid_id, "hire transaction timed out");
            Err(MarketError::storage("hire transaction timed out"))
        });
        let commit = match commit {
            Ok(commit) => commit,
            Err(MarketError::TransactionConflict) => {
                // A concurrent hire committed first. Re-read and report the
                // gig as closed rather than leaking the storage-level
                // conflict. Terminal: no retry against a fresh read.
                debug!(gig_id = %gig.id, bid_id = %bid_id, "lost hire race");
                return match self.store.get_gig(gig.id).await? {
                    None => Err(MarketError::GigNotFound { gig_id: gig.id }),
                    Some(_) => Err(MarketError::AlreadyClosed),
                };
            }
            Err(err) => return Err(err),
        };

        info!(
            gig_id = %commit.gig.id,
            hired_bid = %commit.hired.id,
            responder = %commit.hired.responder_id,
            rejected = commit.rejected.len(),
            "hire finalized"
        );

        // Fan-out strictly after the transaction is durable.
        self.publisher.publish(NotificationEvent::hired(
            commit.hired.responder_id,
            commit.gig.id,
            &commit.gig.title,
        ));
        for loser in &commit.rejected {
            self.publisher.publish(NotificationEvent::bid_rejected(
                loser.responder_id,
                commit.gig.id,
                &commit.gig.title,
            ));
        }

        Ok(HireOutcome {
            gig: commit.gig,
            bid: commit.hired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingPublisher;
    use crate::store::memory::MemoryStore;
    use gigflow_model::{BidDraft, BidStatus, GigDraft, GigStatus, NotificationKind};

    struct Fixture {
        store: Arc<MemoryStore>,
        publisher: Arc<RecordingPublisher>,
        orchestrator: HiringOrchestrator,
        owner: UserId,
        gig: Gig,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let owner = UserId::new();
        let gig = GigDraft::new("Test Gig", "desc", 500)
            .unwrap()
            .into_gig(owner);
        store.insert_gig(&gig).await.unwrap();
        let orchestrator = HiringOrchestrator::new(store.clone(), publisher.clone());
        Fixture {
            store,
            publisher,
            orchestrator,
            owner,
            gig,
        }
    }

    async fn place_bid(fixture: &Fixture, responder: UserId) -> Bid {
        let bid = BidDraft::new(450, "pick me")
            .unwrap()
            .into_bid(fixture.gig.id, responder);
        fixture.store.insert_bid(&bid).await.unwrap();
        bid
    }

    #[tokio::test]
    async fn hire_assigns_gig_and_settles_bids() {
        let fixture = fixture().await;
        let winner = place_bid(&fixture, UserId::new()).await;
        let loser = place_bid(&fixture, UserId::new()).await;

        let outcome = fixture
            .orchestrator
            .hire(winner.id, fixture.owner)
            .await
            .unwrap();
        assert_eq!(outcome.gig.status, GigStatus::Assigned);
        assert_eq!(outcome.bid.status, BidStatus::Hired);

        let loser = fixture.store.get_bid(loser.id).await.unwrap().unwrap();
        assert_eq!(loser.status, BidStatus::Rejected);
    }

    #[tokio::test]
    async fn non_owner_is_forbidden() {
        let fixture = fixture().await;
        let bid = place_bid(&fixture, UserId::new()).await;
        let err = fixture
            .orchestrator
            .hire(bid.id, UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Forbidden));
        assert!(fixture.publisher.events().is_empty());
    }

    #[tokio::test]
    async fn second_hire_reports_already_closed() {
        let fixture = fixture().await;
        let first = place_bid(&fixture, UserId::new()).await;
        let second = place_bid(&fixture, UserId::new()).await;

        fixture
            .orchestrator
            .hire(first.id, fixture.owner)
            .await
            .unwrap();
        let err = fixture
            .orchestrator
            .hire(second.id, fixture.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::AlreadyClosed));
    }

    #[tokio::test]
    async fn missing_bid_is_not_found() {
        let fixture = fixture().await;
        let err = fixture
            .orchestrator
            .hire(BidId::new(), fixture.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::BidNotFound { .. }));
    }

    #[tokio::test]
    async fn events_cover_winner_and_every_loser() {
        let fixture = fixture().await;
        let winner = place_bid(&fixture, UserId::new()).await;
        let loser_a = place_bid(&fixture, UserId::new()).await;
        let loser_b = place_bid(&fixture, UserId::new()).await;

        fixture
            .orchestrator
            .hire(winner.id, fixture.owner)
            .await
            .unwrap();

        let events = fixture.publisher.events();
        assert_eq!(events.len(), 3);

        let hired: Vec<_> = events
            .iter()
            .filter(|e| e.kind == NotificationKind::Hired)
            .collect();
        assert_eq!(hired.len(), 1);
        assert_eq!(hired[0].user_id, winner.responder_id);

        let rejected: Vec<_> = events
            .iter()
            .filter(|e| e.kind == NotificationKind::BidRejected)
            .map(|e| e.user_id)
            .collect();
        assert!(rejected.contains(&loser_a.responder_id));
        assert!(rejected.contains(&loser_b.responder_id));
    }

    /// A store whose hire transaction never completes. Every other operation
    /// behaves normally.
    struct StalledCommitStore {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl MarketStore for StalledCommitStore {
        async fn get_gig(&self, gig_id: gigflow_model::GigId) -> crate::Result<Option<Gig>> {
            self.inner.get_gig(gig_id).await
        }
        async fn get_bid(&self, bid_id: BidId) -> crate::Result<Option<Bid>> {
            self.inner.get_bid(bid_id).await
        }
        async fn list_open_gigs(&self, search: Option<&str>) -> crate::Result<Vec<Gig>> {
            self.inner.list_open_gigs(search).await
        }
        async fn list_bids_for_gig(&self, gig_id: gigflow_model::GigId) -> crate::Result<Vec<Bid>> {
            self.inner.list_bids_for_gig(gig_id).await
        }
        async fn find_bid_by_responder(
            &self,
            gig_id: gigflow_model::GigId,
            responder_id: UserId,
        ) -> crate::Result<Option<Bid>> {
            self.inner.find_bid_by_responder(gig_id, responder_id).await
        }
        async fn insert_gig(&self, gig: &Gig) -> crate::Result<()> {
            self.inner.insert_gig(gig).await
        }
        async fn insert_bid(&self, bid: &Bid) -> crate::Result<()> {
            self.inner.insert_bid(bid).await
        }
        async fn commit_hire(
            &self,
            _gig_id: gigflow_model::GigId,
            _bid_id: BidId,
        ) -> crate::Result<crate::store::HireCommit> {
            std::future::pending().await
        }
        async fn reject_bid(&self, bid_id: BidId) -> crate::Result<Bid> {
            self.inner.reject_bid(bid_id).await
        }
    }

    #[tokio::test]
    async fn stalled_commit_fails_within_the_bound() {
        let store = StalledCommitStore {
            inner: MemoryStore::new(),
        };
        let owner = UserId::new();
        let gig = GigDraft::new("Test Gig", "desc", 500)
            .unwrap()
            .into_gig(owner);
        store.inner.insert_gig(&gig).await.unwrap();
        let bid = BidDraft::new(450, "pick me")
            .unwrap()
            .into_bid(gig.id, UserId::new());
        store.inner.insert_bid(&bid).await.unwrap();

        let publisher = Arc::new(RecordingPublisher::new());
        let orchestrator = HiringOrchestrator::new(Arc::new(store), publisher.clone())
            .with_commit_timeout(Duration::from_millis(50));

        let err = orchestrator.hire(bid.id, owner).await.unwrap_err();
        assert!(matches!(err, MarketError::Storage { .. }));
        assert!(publisher.events().is_empty());
    }

    #[tokio::test]
    async fn losing_hire_publishes_nothing() {
        let fixture = fixture().await;
        let first = place_bid(&fixture, UserId::new()).await;
        let second = place_bid(&fixture, UserId::new()).await;

        fixture
            .orchestrator
            .hire(first.id, fixture.owner)
            .await
            .unwrap();
        let before = fixture.publisher.events().len();

        let _ = fixture
            .orchestrator
            .hire(second.id, fixture.owner)
            .await
            .unwrap_err();
        assert_eq!(fixture.publisher.events().len(), before);
    }
}
