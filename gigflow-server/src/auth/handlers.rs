//! Account registration and login.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use gigflow_model::User;

use crate::auth::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let name = req.name.trim();
    let email = req.email.trim().to_ascii_lowercase();
    if name.is_empty() || email.is_empty() {
        return Err(AppError::bad_request("Name and email are required"));
    }
    if !email.contains('@') {
        return Err(AppError::bad_request("Invalid email address"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let user = User::new(name, &email);
    let password_hash = hash_password(&req.password)?;
    state.store.insert_user(&user, &password_hash).await?;

    let token = state
        .auth
        .generate_token(user.id.to_uuid())
        .map_err(|e| AppError::internal(format!("failed to issue token: {e}")))?;

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(SessionResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<SessionResponse>> {
    let email = req.email.trim().to_ascii_lowercase();

    // Invalid email and invalid password are indistinguishable to the caller.
    let invalid = || AppError::unauthorized("Invalid credentials");

    let user = state
        .store
        .get_user_by_email(&email)
        .await?
        .ok_or_else(invalid)?;
    let hash = state
        .store
        .get_password_hash(user.id)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&req.password, &hash) {
        return Err(invalid());
    }

    let token = state
        .auth
        .generate_token(user.id.to_uuid())
        .map_err(|e| AppError::internal(format!("failed to issue token: {e}")))?;

    Ok(Json(SessionResponse { token, user }))
}

pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}
