//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;
use tracing::instrument;

use shopfront_core::models::{AuthResponse, Credentials};

use crate::error::Result;
use crate::middleware::BearerToken;
use crate::services::AuthService;
use crate::state::AppState;

/// Register a new account and log it in.
///
/// POST /api/auth/register
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let auth = AuthService::new(state.store(), state.tokens());
    let response = auth.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange credentials for a bearer token.
///
/// POST /api/auth/login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.store(), state.tokens());
    Ok(Json(auth.login(&credentials).await?))
}

/// Revoke the caller's bearer token.
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, BearerToken(token): BearerToken) -> StatusCode {
    AuthService::new(state.store(), state.tokens())
        .logout(&token)
        .await;
    StatusCode::NO_CONTENT
}
