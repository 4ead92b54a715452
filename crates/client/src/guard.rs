//! Route guards.

use std::sync::Arc;

use crate::navigation::{HOME, Navigator};
use crate::notify::Notify;
use crate::state::AuthState;
use crate::store::Store;

/// Shown to non-admins turned away from an admin view.
pub const NOT_ADMIN: &str = "You are not an Admin!";

/// What a guard decided for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect {
        to: &'static str,
        message: &'static str,
    },
}

/// Admin check over an auth snapshot.
#[must_use]
pub fn admin_guard(state: &AuthState) -> GuardOutcome {
    if state.is_admin() {
        GuardOutcome::Allow
    } else {
        GuardOutcome::Redirect {
            to: HOME,
            message: NOT_ADMIN,
        }
    }
}

/// Guards admin views, notifying and redirecting when it refuses.
#[derive(Clone)]
pub struct AdminGuard {
    auth: Arc<Store<AuthState>>,
    notify: Arc<dyn Notify>,
    navigator: Arc<dyn Navigator>,
}

impl AdminGuard {
    #[must_use]
    pub fn new(
        auth: Arc<Store<AuthState>>,
        notify: Arc<dyn Notify>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            notify,
            navigator,
        }
    }

    /// Whether the current user may enter. On refusal the user has already
    /// been notified and sent elsewhere.
    #[must_use]
    pub fn can_activate(&self) -> bool {
        match admin_guard(&self.auth.state()) {
            GuardOutcome::Allow => true,
            GuardOutcome::Redirect { to, message } => {
                self.notify.error(message);
                self.navigator.navigate(to);
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::models::{AuthResponse, User};
    use shopfront_core::{City, Role, UserId};

    use super::*;
    use crate::navigation::History;
    use crate::notify::tests::{Note, Recorder};
    use crate::state::AuthAction;

    fn login(store: &Store<AuthState>, role: Role) {
        store.dispatch(AuthAction::Login(AuthResponse {
            token: "t".to_string(),
            user: User {
                id: UserId::generate(),
                id_number: "123456789".to_string(),
                username: "dana".to_string(),
                first_name: "Dana".to_string(),
                last_name: "Levi".to_string(),
                city: City::Haifa,
                street: "Herzl 5".to_string(),
                role,
            },
        }));
    }

    fn guard() -> (Arc<Store<AuthState>>, Arc<Recorder>, Arc<History>, AdminGuard) {
        let auth = Arc::new(Store::new());
        let notify = Arc::new(Recorder::default());
        let history = Arc::new(History::new());
        let guard = AdminGuard::new(
            Arc::clone(&auth),
            Arc::clone(&notify) as Arc<dyn Notify>,
            Arc::clone(&history) as Arc<dyn Navigator>,
        );
        (auth, notify, history, guard)
    }

    #[test]
    fn test_admin_guard_is_pure() {
        assert_eq!(
            admin_guard(&AuthState::default()),
            GuardOutcome::Redirect {
                to: "/home",
                message: "You are not an Admin!"
            }
        );

        let store = Store::new();
        login(&store, Role::Admin);
        assert_eq!(admin_guard(&store.state()), GuardOutcome::Allow);
    }

    #[test]
    fn test_non_admin_redirected_home() {
        let (auth, notify, history, guard) = guard();
        login(&auth, Role::User);

        assert!(!guard.can_activate());
        assert_eq!(notify.notes(), vec![Note::Error(NOT_ADMIN.to_string())]);
        assert_eq!(history.current().as_deref(), Some(HOME));
    }

    #[test]
    fn test_admin_passes_unredirected() {
        let (auth, notify, history, guard) = guard();
        login(&auth, Role::Admin);

        assert!(guard.can_activate());
        assert!(notify.notes().is_empty());
        assert_eq!(history.current(), None);
    }
}
