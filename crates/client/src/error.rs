//! Client error types.

use thiserror::Error;

use shopfront_core::ValidationErrors;

/// Errors surfaced by client services.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection, TLS, body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    /// The payload was rejected by a schema, locally or by the server.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// A success response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// An endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// HTTP status of a server-side rejection, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Validation(_) | Self::Http(_) | Self::Decode(_) | Self::Url(_) => None,
        }
    }
}
