//! Client configuration.
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_API_URL` - Base URL of the API (default: `http://127.0.0.1:3030/`)

use thiserror::Error;
use url::Url;

/// Default API location for local development.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3030/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, always ending in `/`.
    pub api_url: Url,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SHOPFRONT_API_URL` is not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let raw = std::env::var("SHOPFRONT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::with_api_url(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e.to_string()))
    }

    /// Configuration pointing at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `api_url` is not a valid URL.
    pub fn with_api_url(api_url: &str) -> Result<Self, url::ParseError> {
        let mut api_url = Url::parse(api_url.trim())?;
        // Relative joins drop the last segment unless the path ends in a slash
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        Ok(Self { api_url })
    }
}
