//! In-memory store implementation for tests and development.
//!
//! All tables live behind one async mutex, which makes every write — the
//! hire transaction included — trivially atomic within the process.
//!
//! ## Limitations
//!
//! - **Not suitable for production**: no durability, single-process only
//! - **No persistence**: all state is lost when the process exits

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use gigflow_model::{Bid, BidId, BidStatus, Gig, GigId, GigStatus, User, UserId};

use super::{HireCommit, IdentityStore, MarketStore};
use crate::error::{MarketError, Result};

#[derive(Debug, Default)]
struct Tables {
    gigs: HashMap<GigId, Gig>,
    bids: HashMap<BidId, Bid>,
    users: HashMap<UserId, User>,
    credentials: HashMap<UserId, String>,
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bids currently stored.
    pub async fn bid_count(&self) -> usize {
        self.tables.lock().await.bids.len()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn get_gig(&self, gig_id: GigId) -> Result<Option<Gig>> {
        Ok(self.tables.lock().await.gigs.get(&gig_id).cloned())
    }

    async fn get_bid(&self, bid_id: BidId) -> Result<Option<Bid>> {
        Ok(self.tables.lock().await.bids.get(&bid_id).cloned())
    }

    async fn list_open_gigs(&self, search: Option<&str>) -> Result<Vec<Gig>> {
        let tables = self.tables.lock().await;
        let needle = search.map(str::to_lowercase);
        let mut gigs: Vec<Gig> = tables
            .gigs
            .values()
            .filter(|gig| gig.is_open())
            .filter(|gig| match &needle {
                Some(needle) => {
                    gig.title.to_lowercase().contains(needle)
                        || gig.description.to_lowercase().contains(needle)
                }
                None => true,
            })
            .cloned()
            .collect();
        gigs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(gigs)
    }

    async fn list_bids_for_gig(&self, gig_id: GigId) -> Result<Vec<Bid>> {
        let tables = self.tables.lock().await;
        let mut bids: Vec<Bid> = tables
            .bids
            .values()
            .filter(|bid| bid.gig_id == gig_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bids)
    }

    async fn find_bid_by_responder(
        &self,
        gig_id: GigId,
        responder_id: UserId,
    ) -> Result<Option<Bid>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bids
            .values()
            .find(|bid| bid.gig_id == gig_id && bid.responder_id == responder_id)
            .cloned())
    }

    async fn insert_gig(&self, gig: &Gig) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.gigs.insert(gig.id, gig.clone());
        Ok(())
    }

    async fn insert_bid(&self, bid: &Bid) -> Result<()> {
        let mut tables = self.tables.lock().await;

        let gig = tables
            .gigs
            .get(&bid.gig_id)
            .ok_or(MarketError::GigNotFound { gig_id: bid.gig_id })?;
        if !gig.is_open() {
            return Err(MarketError::GigClosed);
        }
        let duplicate = tables
            .bids
            .values()
            .any(|existing| existing.gig_id == bid.gig_id && existing.responder_id == bid.responder_id);
        if duplicate {
            return Err(MarketError::DuplicateBid);
        }

        tables.bids.insert(bid.id, bid.clone());
        Ok(())
    }

    async fn commit_hire(&self, gig_id: GigId, bid_id: BidId) -> Result<HireCommit> {
        let mut tables = self.tables.lock().await;

        // The race-arbitration point: only one caller observes open here.
        let gig = tables
            .gigs
            .get(&gig_id)
            .ok_or(MarketError::GigNotFound { gig_id })?;
        if gig.status != GigStatus::Open {
            return Err(MarketError::TransactionConflict);
        }

        let bid = tables
            .bids
            .get(&bid_id)
            .ok_or(MarketError::BidNotFound { bid_id })?;
        if bid.status != BidStatus::Pending {
            // Abort without touching the gig; it stays open.
            return Err(MarketError::BidNotPending);
        }

        let gig = {
            let gig = tables
                .gigs
                .get_mut(&gig_id)
                .ok_or(MarketError::GigNotFound { gig_id })?;
            gig.status = GigStatus::Assigned;
            gig.clone()
        };

        let mut rejected = Vec::new();
        for sibling in tables.bids.values_mut() {
            if sibling.gig_id == gig_id && sibling.id != bid_id && sibling.is_pending() {
                sibling.status = BidStatus::Rejected;
                rejected.push(sibling.clone());
            }
        }
        rejected.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let hired = {
            let bid = tables
                .bids
                .get_mut(&bid_id)
                .ok_or(MarketError::BidNotFound { bid_id })?;
            bid.status = BidStatus::Hired;
            bid.clone()
        };

        Ok(HireCommit {
            gig,
            hired,
            rejected,
        })
    }

    async fn reject_bid(&self, bid_id: BidId) -> Result<Bid> {
        let mut tables = self.tables.lock().await;

        let (gig_id, status) = {
            let bid = tables
                .bids
                .get(&bid_id)
                .ok_or(MarketError::BidNotFound { bid_id })?;
            (bid.gig_id, bid.status)
        };
        let gig_open = tables.gigs.get(&gig_id).is_some_and(Gig::is_open);
        if !gig_open {
            return Err(MarketError::GigClosed);
        }
        if status != BidStatus::Pending {
            return Err(MarketError::BidNotPending);
        }

        let bid = tables
            .bids
            .get_mut(&bid_id)
            .ok_or(MarketError::BidNotFound { bid_id })?;
        bid.status = BidStatus::Rejected;
        Ok(bid.clone())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let taken = tables
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(MarketError::Conflict("email already registered".into()));
        }
        tables.users.insert(user.id, user.clone());
        tables.credentials.insert(user.id, password_hash.to_string());
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_password_hash(&self, user_id: UserId) -> Result<Option<String>> {
        Ok(self.tables.lock().await.credentials.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigflow_model::{BidDraft, GigDraft};

    fn open_gig(owner: UserId) -> Gig {
        GigDraft::new("Test Gig", "A test gig", 500)
            .unwrap()
            .into_gig(owner)
    }

    fn pending_bid(gig_id: GigId, responder: UserId) -> Bid {
        BidDraft::new(450, "I can do this!")
            .unwrap()
            .into_bid(gig_id, responder)
    }

    #[tokio::test]
    async fn insert_bid_enforces_gig_open() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let mut gig = open_gig(owner);
        gig.status = GigStatus::Assigned;
        store.insert_gig(&gig).await.unwrap();

        let err = store
            .insert_bid(&pending_bid(gig.id, UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::GigClosed));
    }

    #[tokio::test]
    async fn insert_bid_enforces_uniqueness() {
        let store = MemoryStore::new();
        let gig = open_gig(UserId::new());
        store.insert_gig(&gig).await.unwrap();

        let responder = UserId::new();
        store
            .insert_bid(&pending_bid(gig.id, responder))
            .await
            .unwrap();
        let err = store
            .insert_bid(&pending_bid(gig.id, responder))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::DuplicateBid));
    }

    #[tokio::test]
    async fn commit_hire_finalizes_all_records() {
        let store = MemoryStore::new();
        let gig = open_gig(UserId::new());
        store.insert_gig(&gig).await.unwrap();
        let winner = pending_bid(gig.id, UserId::new());
        let loser = pending_bid(gig.id, UserId::new());
        store.insert_bid(&winner).await.unwrap();
        store.insert_bid(&loser).await.unwrap();

        let commit = store.commit_hire(gig.id, winner.id).await.unwrap();
        assert_eq!(commit.gig.status, GigStatus::Assigned);
        assert_eq!(commit.hired.status, BidStatus::Hired);
        assert_eq!(commit.rejected.len(), 1);
        assert_eq!(commit.rejected[0].id, loser.id);

        // Second commit on the same gig loses the CAS.
        let err = store.commit_hire(gig.id, loser.id).await.unwrap_err();
        assert!(matches!(err, MarketError::TransactionConflict));
    }

    #[tokio::test]
    async fn commit_hire_aborts_on_decided_bid_without_closing_gig() {
        let store = MemoryStore::new();
        let gig = open_gig(UserId::new());
        store.insert_gig(&gig).await.unwrap();
        let bid = pending_bid(gig.id, UserId::new());
        store.insert_bid(&bid).await.unwrap();
        store.reject_bid(bid.id).await.unwrap();

        let err = store.commit_hire(gig.id, bid.id).await.unwrap_err();
        assert!(matches!(err, MarketError::BidNotPending));

        // Nothing committed; the gig is still open for other bids.
        let gig = store.get_gig(gig.id).await.unwrap().unwrap();
        assert_eq!(gig.status, GigStatus::Open);
    }

    #[tokio::test]
    async fn reject_checks_gig_state_at_write_time() {
        let store = MemoryStore::new();
        let gig = open_gig(UserId::new());
        store.insert_gig(&gig).await.unwrap();
        let winner = pending_bid(gig.id, UserId::new());
        let other = pending_bid(gig.id, UserId::new());
        store.insert_bid(&winner).await.unwrap();
        store.insert_bid(&other).await.unwrap();
        store.commit_hire(gig.id, winner.id).await.unwrap();

        let err = store.reject_bid(other.id).await.unwrap_err();
        assert!(matches!(err, MarketError::GigClosed));
    }

    #[tokio::test]
    async fn email_uniqueness_is_case_insensitive() {
        let store = MemoryStore::new();
        let user = User::new("A", "a@test.com");
        store.insert_user(&user, "hash").await.unwrap();
        let err = store
            .insert_user(&User::new("B", "A@Test.com"), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Conflict(_)));
    }

    #[tokio::test]
    async fn open_gig_search_filters_title_and_description() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let rust_gig = GigDraft::new("Rust backend", "API work", 900)
            .unwrap()
            .into_gig(owner);
        let paint_gig = GigDraft::new("Paint a fence", "Outdoor rust removal", 100)
            .unwrap()
            .into_gig(owner);
        store.insert_gig(&rust_gig).await.unwrap();
        store.insert_gig(&paint_gig).await.unwrap();

        let hits = store.list_open_gigs(Some("rust")).await.unwrap();
        assert_eq!(hits.len(), 2);
        let hits = store.list_open_gigs(Some("fence")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, paint_gig.id);
    }
}
