//! Server-side document and session types.
//!
//! The wire-facing documents live in `shopfront_core::models`; this module
//! holds what never leaves the server.

use serde::{Deserialize, Serialize};

use shopfront_core::models::User;
use shopfront_core::{Role, UserId};

/// A user document as stored, including the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    #[serde(flatten)]
    pub user: User,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Identity attached to a bearer token.
///
/// Minimal data kept per token to authorize requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// Whether this user may act on documents owned by `owner`.
    #[must_use]
    pub fn can_access(&self, owner: UserId) -> bool {
        self.id == owner || self.role.is_admin()
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}
