//! Client services.
//!
//! Services pair an API trait with the stores they keep current. They never
//! hold state of their own; everything a view reads lives in a store.

pub mod auth;
pub mod products;

pub use auth::AuthService;
pub use products::ProductsService;
