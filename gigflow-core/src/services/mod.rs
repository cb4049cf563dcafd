//! Domain services for the hiring engine.
//!
//! Three operations make up the engine's surface: submitting a bid,
//! hiring one bid (which finalizes every other bid of the gig), and
//! rejecting a single bid. Each service authorizes against the caller
//! identity attached by the auth layer and leans on the store's conditional
//! writes for race safety.

mod hiring;
mod intake;
mod rejection;

pub use hiring::{HireOutcome, HiringOrchestrator};
pub use intake::BidIntake;
pub use rejection::BidRejection;
