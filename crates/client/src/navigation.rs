//! Client-side routing.

use std::sync::{Mutex, PoisonError};

/// Landing page after login and registration, and the guard's fallback.
pub const HOME: &str = "/home";

/// Moves the user between views.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigation history kept in memory.
#[derive(Debug, Default)]
pub struct History {
    routes: Mutex<Vec<String>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last route navigated to.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Every route navigated to, oldest first.
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for History {
    fn navigate(&self, route: &str) {
        tracing::debug!(route, "navigate");
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_owned());
    }
}
