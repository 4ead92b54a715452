//! Account service.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use shopfront_core::ValidationErrors;
use shopfront_core::models::{AuthResponse, Credentials, Registration, User};
use shopfront_core::validation::USER_SCHEMA;

use crate::api::AuthApi;
use crate::error::ClientError;
use crate::state::{AuthAction, AuthState};
use crate::store::Store;

/// Registration, login and logout, mirrored into the auth store.
pub struct AuthService<A: ?Sized> {
    api: Arc<A>,
    auth: Arc<Store<AuthState>>,
}

impl<A: ?Sized> Clone for AuthService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            auth: Arc::clone(&self.auth),
        }
    }
}

impl<A: AuthApi + ?Sized> AuthService<A> {
    #[must_use]
    pub const fn new(api: Arc<A>, auth: Arc<Store<AuthState>>) -> Self {
        Self { api, auth }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.auth.state().user.clone()
    }

    /// Register a new account and log it in.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the registration fails the user
    /// schema, otherwise whatever the API call returns.
    #[instrument(skip_all, fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError> {
        let payload = serde_json::to_value(registration)
            .map_err(|e| ValidationErrors::single("users", e.to_string()))?;
        USER_SCHEMA.validate(&payload)?;

        let response = self.api.register(registration).await?;
        info!(user_id = %response.user.id, "Registered");
        self.auth.dispatch(AuthAction::Login(response.clone()));
        Ok(response)
    }

    /// Log in and store the session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the credentials are rejected or the request
    /// fails.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError> {
        let response = self.api.login(credentials).await?;
        self.auth.dispatch(AuthAction::Login(response.clone()));
        Ok(response)
    }

    /// End the session. The local session is cleared even if the server call
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns the server call's error, after the store has been cleared.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.api.logout().await;
        if let Err(e) = &result {
            warn!(error = %e, "Logout request failed");
        }
        self.auth.dispatch(AuthAction::Logout);
        result
    }
}
