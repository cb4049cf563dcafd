//! # GigFlow Server
//!
//! HTTP and WebSocket front-end for the GigFlow marketplace.
//!
//! ## Overview
//!
//! - **Gigs and bids**: REST endpoints for posting gigs, submitting bids,
//!   and the hire/reject decisions that close a gig
//! - **Hiring engine**: all decision endpoints delegate to
//!   [`gigflow_core`], which arbitrates concurrent hires in the store
//! - **Notifications**: hire/reject outcomes are broadcast to every
//!   connected WebSocket client; clients filter by their own identity
//! - **Auth**: bearer-token JWT sessions issued at register/login
//!
//! ## Architecture
//!
//! The server is built on Axum and uses PostgreSQL for persistent storage,
//! falling back to the in-process store for development.

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod hub;
pub mod routes;
pub mod state;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use hub::NotificationHub;
pub use state::AppState;
