//! Errors raised while registering and logging in.

use thiserror::Error;

use shopfront_core::ValidationErrors;

use crate::db::RepositoryError;

/// Failure modes of [`super::AuthService`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration payload failed the user schema.
    #[error("invalid registration: {0}")]
    Validation(#[from] ValidationErrors),

    /// Unknown username or wrong password. Both look the same to the caller.
    #[error("username or password is incorrect")]
    InvalidCredentials,

    /// Another account owns this username.
    #[error("username already taken")]
    UserAlreadyExists,

    #[error("document store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Argon2 failed to hash or parse a stored hash.
    #[error("could not hash password")]
    PasswordHash,
}
