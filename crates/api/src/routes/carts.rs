//! Cart route handlers.
//!
//! Carts are only visible to their owner or an admin.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::Value;

use shopfront_core::models::{Cart, CartItem, NewCartItem};
use shopfront_core::validation::CART_ITEM_SCHEMA;
use shopfront_core::{CartId, CartItemId, ProductId, UserId, ValidationErrors};

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

const NOT_YOUR_CART: &str = "You can only access your own cart";

/// Load a cart the caller may access.
async fn accessible_cart(state: &AppState, user: &CurrentUser, id: CartId) -> Result<Cart> {
    let cart = CartRepository::new(state.store())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cart {id}")))?;

    if !user.can_access(cart.user_id) {
        return Err(AppError::Forbidden(NOT_YOUR_CART.to_string()));
    }
    Ok(cart)
}

/// Open a cart for the caller, reusing an already open one.
///
/// POST /api/carts
pub async fn open(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<Cart>)> {
    let carts = CartRepository::new(state.store());

    if let Some(cart) = carts.open_for_user(user.id).await? {
        return Ok((StatusCode::OK, Json(cart)));
    }

    let cart = Cart {
        id: CartId::generate(),
        user_id: user.id,
        created_at: Utc::now(),
        is_open: true,
    };
    carts.create(&cart).await?;

    tracing::info!(cart_id = %cart.id, user_id = %user.id, "Cart opened");
    Ok((StatusCode::CREATED, Json(cart)))
}

/// The open cart of a user, or `null`.
///
/// GET /api/carts/by-user/{userId}
pub async fn by_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<UserId>,
) -> Result<Json<Option<Cart>>> {
    if !user.can_access(user_id) {
        return Err(AppError::Forbidden(NOT_YOUR_CART.to_string()));
    }
    let cart = CartRepository::new(state.store())
        .open_for_user(user_id)
        .await?;
    Ok(Json(cart))
}

/// Lines of a cart.
///
/// GET /api/carts/{id}/items
pub async fn items(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartId>,
) -> Result<Json<Vec<CartItem>>> {
    let cart = accessible_cart(&state, &user, id).await?;
    let items = CartRepository::new(state.store()).items(cart.id).await?;
    Ok(Json(items))
}

/// Add a product to an open cart, replacing any existing line for it.
///
/// POST /api/carts/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartId>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let cart = accessible_cart(&state, &user, id).await?;
    if !cart.is_open {
        return Err(AppError::Conflict("Cart is already ordered".to_string()));
    }

    let new_item: NewCartItem = CART_ITEM_SCHEMA.parse(&payload)?;
    let product = ProductRepository::new(state.store())
        .get(new_item.product_id)
        .await?
        .ok_or_else(|| ValidationErrors::single("productId", "Product does not exist"))?;

    let item = CartItem {
        id: CartItemId::generate(),
        cart_id: cart.id,
        product_id: product.id,
        quantity: new_item.quantity,
        total_price: product.price.times(new_item.quantity),
    };
    let stored = CartRepository::new(state.store()).put_item(&item).await?;

    tracing::debug!(cart_id = %cart.id, product_id = %product.id, "Cart item stored");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Remove a product's line from an open cart.
///
/// DELETE /api/carts/{id}/items/{productId}
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((id, product_id)): Path<(CartId, ProductId)>,
) -> Result<StatusCode> {
    let cart = accessible_cart(&state, &user, id).await?;
    if !cart.is_open {
        return Err(AppError::Conflict("Cart is already ordered".to_string()));
    }

    let removed = CartRepository::new(state.store())
        .remove_item(cart.id, product_id)
        .await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("product {product_id} in cart {id}")))
    }
}
