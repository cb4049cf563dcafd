//! Gig listing and creation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use gigflow_core::MarketError;
use gigflow_model::{Gig, GigDraft, GigId};

use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListGigsQuery {
    /// Case-insensitive filter over title and description.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGigRequest {
    pub title: String,
    pub description: String,
    pub budget: i64,
}

/// `GET /api/gigs` — open gigs, newest first. Public.
pub async fn list_gigs(
    State(state): State<AppState>,
    Query(query): Query<ListGigsQuery>,
) -> AppResult<Json<Vec<Gig>>> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let gigs = state.store.list_open_gigs(search).await?;
    Ok(Json(gigs))
}

/// `GET /api/gigs/{id}` — a single gig, open or assigned. Public.
pub async fn get_gig(
    State(state): State<AppState>,
    Path(gig_id): Path<GigId>,
) -> AppResult<Json<Gig>> {
    let gig = state
        .store
        .get_gig(gig_id)
        .await?
        .ok_or(MarketError::GigNotFound { gig_id })?;
    Ok(Json(gig))
}

/// `POST /api/gigs` — posts a new open gig owned by the caller.
pub async fn create_gig(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateGigRequest>,
) -> AppResult<(StatusCode, Json<Gig>)> {
    let draft = GigDraft::new(&req.title, &req.description, req.budget)
        .map_err(MarketError::Validation)?;
    let gig = draft.into_gig(auth.user.id);
    state.store.insert_gig(&gig).await?;

    info!(gig_id = %gig.id, owner = %gig.owner_id, "gig posted");
    Ok((StatusCode::CREATED, Json(gig)))
}
