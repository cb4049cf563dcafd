pub mod handlers;
pub mod jwt;
pub mod password;

pub use jwt::{AuthKeys, Claims};

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use gigflow_model::User;

use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated caller, attached to requests by the bearer-token
/// extractor. The hiring engine only ever looks at `user.id`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let claims = state
            .auth
            .validate_token(&token)
            .map_err(|_| AppError::unauthorized("Not authorized, token failed"))?;

        let user = state
            .store
            .get_user(claims.sub.into())
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        Ok(Self { user })
    }
}

fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Not authorized, no token"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::unauthorized("Not authorized, no token"))
}
