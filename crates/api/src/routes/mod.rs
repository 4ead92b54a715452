//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Document store reachable
//!
//! # Auth
//! POST   /api/auth/register               - Create account, returns token
//! POST   /api/auth/login                  - Returns token
//! POST   /api/auth/logout                 - Revoke token
//!
//! # Catalog
//! GET    /api/products                    - Product listing
//! GET    /api/products/count              - Product count
//! GET    /api/products/{id}               - Product detail
//! POST   /api/products                    - Create (admin, multipart)
//! PUT    /api/products/{id}               - Replace (admin, multipart)
//! GET    /api/products/images/{name}      - Uploaded images
//! GET    /api/categories                  - Category listing
//!
//! # Carts (requires auth)
//! POST   /api/carts                       - Open (or reuse) the caller's cart
//! GET    /api/carts/by-user/{userId}      - Open cart of a user
//! GET    /api/carts/{id}/items            - Cart lines
//! POST   /api/carts/{id}/items            - Add or replace a line
//! DELETE /api/carts/{id}/items/{productId} - Remove a line
//!
//! # Orders
//! POST   /api/orders                      - Checkout (requires auth)
//! GET    /api/orders/{id}                 - Order with user and cart (requires auth)
//! GET    /api/orders/count                - Number of orders
//! ```

pub mod auth;
pub mod carts;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Largest accepted product upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes(images_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/count", get(products::count))
        .route("/{id}", get(products::show).put(products::update))
        .nest_service("/images", ServeDir::new(images_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new().route("/", get(categories::index))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(carts::open))
        .route("/by-user/{user_id}", get(carts::by_user))
        .route("/{id}/items", get(carts::items).post(carts::add_item))
        .route("/{id}/items/{product_id}", delete(carts::remove_item))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/count", get(orders::count))
        .route("/{id}", get(orders::show))
}

/// Create all routes for the API.
pub fn routes(images_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes(images_dir))
        .nest("/api/categories", category_routes())
        .nest("/api/carts", cart_routes())
        .nest("/api/orders", order_routes())
}
