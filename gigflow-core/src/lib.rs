//! # GigFlow Core
//!
//! The hiring engine: the state machine and concurrency-control protocol
//! that moves a gig and its bids from an open, biddable state to a single,
//! irrevocable hire decision.
//!
//! ## Overview
//!
//! - [`store`] — the `MarketStore` port with compare-and-set write
//!   semantics, plus in-memory and Postgres implementations.
//! - [`services`] — bid intake, the hiring orchestrator, and the bid
//!   rejection service.
//! - [`notify`] — the outbound publisher seam for real-time fan-out.
//!
//! ## Correctness
//!
//! Two owners of the same gig racing to hire different bids must not both
//! succeed. The arbitration point is a single conditional write flipping the
//! gig from `open` to `assigned`; only the caller whose transaction wins
//! that write may finalize bid states, and losing callers observe
//! [`error::MarketError::AlreadyClosed`]. Notification events are published
//! only after the winning transaction is durable.

pub mod error;
pub mod notify;
pub mod services;
pub mod store;

pub use error::{MarketError, Result};
pub use notify::NotificationPublisher;
pub use services::{BidIntake, BidRejection, HireOutcome, HiringOrchestrator};
pub use store::{HireCommit, IdentityStore, MarketStore, Store};
