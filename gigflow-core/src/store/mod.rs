//! Pluggable persistence for marketplace state.
//!
//! The [`MarketStore`] trait defines the persistence port for gigs and bids.
//!
//! ## Design Principles
//!
//! - **CAS semantics**: every status write is conditional on the state it
//!   leaves, so races are decided by the store, not by in-process locks
//! - **One transaction**: only [`MarketStore::commit_hire`] needs
//!   multi-record atomicity; everything else is a single conditional write
//! - **Testability**: in-memory implementation for tests, Postgres for
//!   production

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use gigflow_model::{Bid, BidId, Gig, GigId, User, UserId};

use crate::error::Result;

/// Result of the multi-record hire transaction.
///
/// Returned only when the whole transition committed: gig `open → assigned`,
/// target bid `pending → hired`, and every other pending bid of the gig
/// `pending → rejected`.
#[derive(Debug, Clone)]
pub struct HireCommit {
    /// The gig, now assigned.
    pub gig: Gig,
    /// The winning bid, now hired.
    pub hired: Bid,
    /// The sibling bids this commit moved from pending to rejected.
    pub rejected: Vec<Bid>,
}

/// Storage port for gigs and bids.
///
/// ## CAS Semantics
///
/// `commit_hire` is the arbitration primitive for concurrent hires: its
/// first effect is a conditional flip of `gig.status` from open to assigned,
/// and implementations must report
/// [`crate::MarketError::TransactionConflict`] to the caller that loses that
/// flip. `insert_bid` and `reject_bid` re-check their preconditions at write
/// time, so a stale read can never produce a write that violates the gig
/// lifecycle.
#[async_trait]
pub trait MarketStore: Send + Sync {
    // --- Reads ---

    /// Gets a gig by ID. Returns `None` if it does not exist.
    async fn get_gig(&self, gig_id: GigId) -> Result<Option<Gig>>;

    /// Gets a bid by ID. Returns `None` if it does not exist.
    async fn get_bid(&self, bid_id: BidId) -> Result<Option<Bid>>;

    /// Lists open gigs, newest first, optionally filtered by a search term
    /// over title and description.
    async fn list_open_gigs(&self, search: Option<&str>) -> Result<Vec<Gig>>;

    /// Lists all bids for a gig, newest first.
    async fn list_bids_for_gig(&self, gig_id: GigId) -> Result<Vec<Bid>>;

    /// Finds the bid a responder placed on a gig, if any.
    async fn find_bid_by_responder(
        &self,
        gig_id: GigId,
        responder_id: UserId,
    ) -> Result<Option<Bid>>;

    // --- Writes ---

    /// Persists a new gig.
    async fn insert_gig(&self, gig: &Gig) -> Result<()>;

    /// Persists a new pending bid.
    ///
    /// The write is conditional on the gig still being open and enforces the
    /// one-bid-per-responder-per-gig constraint.
    ///
    /// # Errors
    ///
    /// - [`crate::MarketError::GigNotFound`] if the gig does not exist
    /// - [`crate::MarketError::GigClosed`] if the gig is no longer open
    /// - [`crate::MarketError::DuplicateBid`] if the responder already bid
    async fn insert_bid(&self, bid: &Bid) -> Result<()>;

    /// Executes the atomic accept-one-reject-rest transition.
    ///
    /// Within a single transaction: sets the gig to assigned, the target bid
    /// to hired, and every other pending bid of the gig to rejected. All
    /// three commit together or none do.
    ///
    /// # Errors
    ///
    /// - [`crate::MarketError::TransactionConflict`] if a concurrent
    ///   transaction assigned the gig first (the caller must re-read and
    ///   reclassify)
    /// - [`crate::MarketError::BidNotPending`] if the target bid was decided
    ///   after the gig flip but before the bid write; the transaction is
    ///   aborted and the gig stays open
    /// - [`crate::MarketError::GigNotFound`] / [`crate::MarketError::BidNotFound`]
    ///   if either record is missing
    /// - [`crate::MarketError::Storage`] if the transaction cannot finish
    ///   within the implementation's execution bound (retryable)
    async fn commit_hire(&self, gig_id: GigId, bid_id: BidId) -> Result<HireCommit>;

    /// Moves a single bid from pending to rejected.
    ///
    /// The write re-checks both `bid.status = pending` and
    /// `gig.status = open` at write time, so a reject racing a concurrent
    /// hire loses cleanly instead of mutating an assigned gig's bid.
    ///
    /// # Errors
    ///
    /// - [`crate::MarketError::BidNotFound`] if the bid does not exist
    /// - [`crate::MarketError::GigClosed`] if the gig is no longer open
    /// - [`crate::MarketError::BidNotPending`] if the bid was already decided
    async fn reject_bid(&self, bid_id: BidId) -> Result<Bid>;
}

/// Storage port for user accounts.
///
/// The hiring engine itself never reads these; they exist for the identity
/// guard and the account plumbing around it.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Persists a new user with their password hash.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MarketError::Conflict`] if the email is taken.
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()>;

    /// Gets a user by ID.
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Gets the password hash for a user.
    async fn get_password_hash(&self, user_id: UserId) -> Result<Option<String>>;
}

/// Full persistence surface: marketplace records plus user accounts.
pub trait Store: MarketStore + IdentityStore {}

impl<T: MarketStore + IdentityStore> Store for T {}
