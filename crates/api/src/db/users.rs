//! User repository.

use shopfront_core::{Role, UserId};

use super::{Collection, DocumentStore, RepositoryError, decode, encode};
use crate::models::StoredUser;

/// Repository for user accounts.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or the document is corrupt.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<StoredUser>, RepositoryError> {
        self.store
            .get(Collection::Users, id.as_uuid())
            .await?
            .map(|d| decode(Collection::Users, d))
            .transpose()
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or the document is corrupt.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, RepositoryError> {
        let documents = self
            .store
            .find_by(Collection::Users, "username", username)
            .await?;
        documents
            .into_iter()
            .next()
            .map(|d| decode(Collection::Users, d))
            .transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    pub async fn create(&self, user: &StoredUser) -> Result<(), RepositoryError> {
        self.store
            .insert(Collection::Users, user.user.id.as_uuid(), encode(user)?)
            .await
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this username.
    pub async fn set_role(&self, username: &str, role: Role) -> Result<StoredUser, RepositoryError> {
        let mut user = self
            .get_by_username(username)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        user.user.role = role;
        self.store
            .replace(Collection::Users, user.user.id.as_uuid(), encode(&user)?)
            .await?;
        Ok(user)
    }
}
