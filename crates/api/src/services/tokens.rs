//! Bearer token issuance.
//!
//! Tokens are opaque random strings mapped to a [`CurrentUser`] in a `moka`
//! cache. They expire after the configured TTL and do not survive a restart.
//! The role is captured at login; a promoted user must log in again.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use moka::future::Cache;
use rand::RngCore;

use crate::models::CurrentUser;

/// Upper bound on concurrently valid tokens.
const MAX_TOKENS: u64 = 100_000;

/// In-memory bearer token registry.
#[derive(Clone)]
pub struct TokenStore {
    tokens: Cache<String, CurrentUser>,
}

impl TokenStore {
    /// Create a token store whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: Cache::builder()
                .max_capacity(MAX_TOKENS)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Issue a fresh token for `user`.
    pub async fn issue(&self, user: CurrentUser) -> String {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        tracing::debug!(user_id = %user.id, "Issued bearer token");
        self.tokens.insert(token.clone(), user).await;
        token
    }

    /// The user a token was issued to, if it is still valid.
    pub async fn resolve(&self, token: &str) -> Option<CurrentUser> {
        self.tokens.get(token).await
    }

    /// Invalidate a token. Unknown tokens are ignored.
    pub async fn revoke(&self, token: &str) {
        self.tokens.invalidate(token).await;
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::{Role, UserId};

    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            username: "dana".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_issue_resolve_revoke() {
        let store = TokenStore::new(Duration::from_secs(60));
        let user = user();
        let token = store.issue(user.clone()).await;

        assert_eq!(store.resolve(&token).await, Some(user));
        store.revoke(&token).await;
        assert_eq!(store.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = TokenStore::new(Duration::from_secs(60));
        let a = store.issue(user()).await;
        let b = store.issue(user()).await;
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = TokenStore::new(Duration::from_secs(60));
        assert!(store.resolve("nope").await.is_none());
    }
}
