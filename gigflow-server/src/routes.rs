//! Route table.

use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use serde_json::{Value, json};

use crate::auth::handlers as auth_handlers;
use crate::handlers::{bids, gigs, ws};
use crate::state::AppState;

/// Builds the full route table. Handlers taking [`crate::auth::AuthUser`]
/// require a bearer token; everything else is public.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/me", get(auth_handlers::me))
        .route("/api/gigs", get(gigs::list_gigs).post(gigs::create_gig))
        .route("/api/gigs/{id}", get(gigs::get_gig))
        .route(
            "/api/gigs/{id}/bids",
            get(bids::list_bids).post(bids::submit_bid),
        )
        .route("/api/gigs/{id}/bids/mine", get(bids::my_bid))
        .route("/api/bids/{id}/hire", patch(bids::hire_bid))
        .route("/api/bids/{id}/reject", patch(bids::reject_bid))
        .route("/ws", get(ws::ws_upgrade))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
