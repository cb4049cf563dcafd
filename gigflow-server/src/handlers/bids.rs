//! Bid submission, inspection, and the hire / reject decisions.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use gigflow_core::MarketError;
use gigflow_model::{Bid, BidId, Gig, GigId};

use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitBidRequest {
    pub price: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HireResponse {
    pub gig: Gig,
    pub bid: Bid,
}

/// `POST /api/gigs/{id}/bids` — places the caller's bid on an open gig.
pub async fn submit_bid(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(gig_id): Path<GigId>,
    Json(req): Json<SubmitBidRequest>,
) -> AppResult<(StatusCode, Json<Bid>)> {
    if state
        .store
        .get_gig(gig_id)
        .await?
        .is_some_and(|gig| gig.is_owned_by(auth.user.id))
    {
        return Err(AppError::bad_request("You cannot bid on your own gig"));
    }

    let bid = state
        .intake
        .submit_bid(gig_id, auth.user.id, req.price, &req.message)
        .await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

/// `GET /api/gigs/{id}/bids` — every bid on the gig. Owner only.
pub async fn list_bids(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(gig_id): Path<GigId>,
) -> AppResult<Json<Vec<Bid>>> {
    let gig = state
        .store
        .get_gig(gig_id)
        .await?
        .ok_or(MarketError::GigNotFound { gig_id })?;
    if !gig.is_owned_by(auth.user.id) {
        return Err(MarketError::Forbidden.into());
    }

    let bids = state.store.list_bids_for_gig(gig_id).await?;
    Ok(Json(bids))
}

/// `GET /api/gigs/{id}/bids/mine` — the caller's own bid on the gig, if any.
pub async fn my_bid(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(gig_id): Path<GigId>,
) -> AppResult<Json<Option<Bid>>> {
    let bid = state
        .store
        .find_bid_by_responder(gig_id, auth.user.id)
        .await?;
    Ok(Json(bid))
}

/// `PATCH /api/bids/{id}/hire` — the irrevocable hire decision.
///
/// At most one hire ever succeeds per gig; concurrent attempts settle through
/// the store's conditional commit, not through anything at this layer.
pub async fn hire_bid(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(bid_id): Path<BidId>,
) -> AppResult<Json<HireResponse>> {
    let outcome = state.orchestrator.hire(bid_id, auth.user.id).await?;
    Ok(Json(HireResponse {
        gig: outcome.gig,
        bid: outcome.bid,
    }))
}

/// `PATCH /api/bids/{id}/reject` — rejects a single pending bid.
pub async fn reject_bid(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(bid_id): Path<BidId>,
) -> AppResult<Json<Bid>> {
    let bid = state.rejection.reject(bid_id, auth.user.id).await?;
    Ok(Json(bid))
}
