//! Authentication service.
//!
//! Provides password registration and login, issuing bearer tokens.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde_json::Value;

use shopfront_core::models::{AuthResponse, Credentials, Registration, User};
use shopfront_core::validation::USER_SCHEMA;
use shopfront_core::{Role, UserId, ValidationErrors};

use crate::db::{DocumentStore, RepositoryError, UserRepository};
use crate::models::{CurrentUser, StoredUser};
use crate::services::tokens::TokenStore;

/// Authentication service.
///
/// Handles user registration, login and logout.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, tokens: &'a TokenStore) -> Self {
        Self {
            users: UserRepository::new(store),
            tokens,
        }
    }

    /// Register a new user from a raw registration payload and log them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the payload fails the user schema.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register(&self, payload: &Value) -> Result<AuthResponse, AuthError> {
        let registration: Registration = USER_SCHEMA.parse(payload)?;
        let city = registration
            .city
            .ok_or_else(|| ValidationErrors::single("city", "Missing city"))?;

        if self
            .users
            .get_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&registration.password)?;

        let user = User {
            id: UserId::generate(),
            id_number: registration.id_number,
            username: registration.username,
            first_name: registration.first_name,
            last_name: registration.last_name,
            city,
            street: registration.street,
            role: Role::User,
        };

        self.users
            .create(&StoredUser {
                user: user.clone(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(self.issue(user).await)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AuthError> {
        let stored = self
            .users
            .get_by_username(credentials.username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&credentials.password, &stored.password_hash)?;

        tracing::info!(user_id = %stored.user.id, "User logged in");
        Ok(self.issue(stored.user).await)
    }

    /// Revoke a bearer token.
    pub async fn logout(&self, token: &str) {
        self.tokens.revoke(token).await;
    }

    async fn issue(&self, user: User) -> AuthResponse {
        let token = self.tokens.issue(CurrentUser::from(&user)).await;
        AuthResponse { token, user }
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::db::MemoryDocumentStore;

    fn payload() -> Value {
        json!({
            "idNumber": "123456789",
            "username": "dana",
            "password": "secret1",
            "firstName": "Dana",
            "lastName": "Levi",
            "city": "Haifa",
            "street": "Herzl 5"
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryDocumentStore::new();
        let tokens = TokenStore::new(Duration::from_secs(60));
        let auth = AuthService::new(&store, &tokens);

        let registered = auth.register(&payload()).await.unwrap();
        assert_eq!(registered.user.username, "dana");
        assert_eq!(registered.user.role, Role::User);
        assert!(tokens.resolve(&registered.token).await.is_some());

        let logged_in = auth
            .login(&Credentials {
                username: "dana".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);

        auth.logout(&logged_in.token).await;
        assert!(tokens.resolve(&logged_in.token).await.is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let store = MemoryDocumentStore::new();
        let tokens = TokenStore::new(Duration::from_secs(60));
        let auth = AuthService::new(&store, &tokens);

        auth.register(&payload()).await.unwrap();
        let err = auth.register(&payload()).await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_validates_schema() {
        let store = MemoryDocumentStore::new();
        let tokens = TokenStore::new(Duration::from_secs(60));
        let auth = AuthService::new(&store, &tokens);

        let mut bad = payload();
        bad["idNumber"] = json!("12");
        let err = auth.register(&bad).await.unwrap_err();
        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.message_for("idNumber"),
            Some("Id number must be exactly 9 digits")
        );
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let store = MemoryDocumentStore::new();
        let tokens = TokenStore::new(Duration::from_secs(60));
        let auth = AuthService::new(&store, &tokens);

        let err = auth
            .login(&Credentials {
                username: "ghost".to_string(),
                password: "whatever".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
