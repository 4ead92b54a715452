//! User-facing notifications.

use tracing::{error, info};

/// Sink for messages shown to the user.
pub trait Notify: Send + Sync {
    /// Report a completed action.
    fn success(&self, message: &str);

    /// Report a failure.
    fn error(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotify;

impl Notify for TracingNotify {
    fn success(&self, message: &str) {
        info!(notification = message, "success");
    }

    fn error(&self, message: &str) {
        error!(notification = message, "error");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Notification as recorded by [`Recorder`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Note {
        Success(String),
        Error(String),
    }

    /// Keeps every notification for assertions.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub(crate) notes: Mutex<Vec<Note>>,
    }

    impl Recorder {
        pub(crate) fn notes(&self) -> Vec<Note> {
            self.notes.lock().unwrap().clone()
        }
    }

    impl Notify for Recorder {
        fn success(&self, message: &str) {
            self.notes.lock().unwrap().push(Note::Success(message.to_owned()));
        }

        fn error(&self, message: &str) {
            self.notes.lock().unwrap().push(Note::Error(message.to_owned()));
        }
    }
}
