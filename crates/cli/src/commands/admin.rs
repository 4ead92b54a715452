//! User role management.
//!
//! # Usage
//!
//! ```bash
//! # Give an existing account the admin role
//! sf-cli admin promote -u dana
//!
//! # Take it away again
//! sf-cli admin demote -u dana
//! ```
//!
//! Accounts are created through registration; these commands only change the
//! role of one that exists. Tokens issued before the change keep the old role
//! until the user logs in again.

use thiserror::Error;

use shopfront_api::db::{PgDocumentStore, RepositoryError, UserRepository};
use shopfront_core::Role;

use super::ConnectError;

/// Errors that can occur during role changes.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// No account has this username.
    #[error("No user with username: {0}")]
    UserNotFound(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Set the role of `username`.
pub async fn set_role(username: &str, role: Role) -> Result<(), AdminError> {
    let store = PgDocumentStore::new(super::connect().await?);

    let user = UserRepository::new(&store)
        .set_role(username, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UserNotFound(username.to_owned()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(user_id = %user.user.id, username, role = %role, "Role updated");
    Ok(())
}
