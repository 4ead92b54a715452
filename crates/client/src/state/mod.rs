//! Client-side stores and their actions.
//!
//! Each store is a [`Store`](crate::store::Store) over one of these states.
//! Catalog stores remember whether they were loaded, so an empty catalog
//! fetched from the server is not fetched again.

pub mod auth;
pub mod categories;
pub mod products;

pub use auth::{AuthAction, AuthState};
pub use categories::{CategoriesAction, CategoriesState};
pub use products::{ProductsAction, ProductsState};
