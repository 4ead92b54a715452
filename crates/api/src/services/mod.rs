//! Business logic services.

pub mod auth;
pub mod images;
pub mod tokens;

pub use auth::{AuthError, AuthService};
pub use images::{ImageError, ImageStore};
pub use tokens::TokenStore;
