//! Authentication extractors.
//!
//! Callers authenticate with `Authorization: Bearer <token>`, where the token
//! was issued by `/api/auth/login` or `/api/auth/register`.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use crate::error::set_sentry_user;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Message sent when no valid bearer token is present.
pub const NOT_LOGGED_IN: &str = "You are not logged in";

/// Message sent when an admin-only route is called by a regular user.
pub const NOT_ADMIN: &str = "You are not an Admin!";

/// Error returned when a request lacks the required identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Missing, malformed, expired or revoked token.
    Unauthorized,
    /// Valid token without the admin role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, NOT_LOGGED_IN).into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, NOT_ADMIN).into_response(),
        }
    }
}

/// The raw bearer token from the `Authorization` header.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthRejection::Unauthorized)?;

        Ok(Self(token.to_string()))
    }
}

/// Extractor that requires a logged-in caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user = state
            .tokens()
            .resolve(&token)
            .await
            .ok_or(AuthRejection::Unauthorized)?;

        set_sentry_user(&user.id, &user.username);
        Ok(Self(user))
    }
}

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            tracing::warn!(user_id = %user.id, "Non-admin attempted admin route");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}
