//! Auth store.

use shopfront_core::models::{AuthResponse, User};

use crate::store::Reducer;

/// The logged-in user and their bearer token, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl AuthState {
    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the logged-in user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }
}

/// Changes to the auth store.
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// A user logged in or registered.
    Login(AuthResponse),
    /// The user logged out.
    Logout,
}

impl Reducer for AuthState {
    type Action = AuthAction;

    fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::Login(AuthResponse { token, user }) => {
                self.user = Some(user);
                self.token = Some(token);
            }
            AuthAction::Logout => *self = Self::default(),
        }
    }
}
