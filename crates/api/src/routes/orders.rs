//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::instrument;

use shopfront_core::models::{NewOrder, Order, OrderView};
use shopfront_core::validation::ORDER_SCHEMA;
use shopfront_core::{OrderId, Price, ValidationErrors};

use crate::db::{CartRepository, OrderRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Largest order total accepted.
const MAX_FINAL_PRICE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Place an order for a cart and close the cart.
///
/// POST /api/orders
///
/// `userId` defaults to the caller. `finalPrice` defaults to the sum of the
/// cart lines and must equal it when given.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Order>)> {
    let new_order: NewOrder = ORDER_SCHEMA.parse(&payload)?;

    let user_id = new_order.user_id.unwrap_or(caller.id);
    if !caller.can_access(user_id) {
        return Err(AppError::Forbidden(
            "You can only order for yourself".to_string(),
        ));
    }
    if UserRepository::new(state.store())
        .get_by_id(user_id)
        .await?
        .is_none()
    {
        return Err(ValidationErrors::single("userId", "User does not exist").into());
    }

    let carts = CartRepository::new(state.store());
    let cart = carts
        .get(new_order.cart_id)
        .await?
        .ok_or_else(|| ValidationErrors::single("cartId", "Cart does not exist"))?;
    if cart.user_id != user_id {
        return Err(ValidationErrors::single("cartId", "Cart does not belong to this user").into());
    }
    if !cart.is_open {
        return Err(AppError::Conflict("Cart is already ordered".to_string()));
    }

    let items = carts.items(cart.id).await?;
    if items.is_empty() {
        return Err(ValidationErrors::single("cartId", "Cart is empty").into());
    }

    let total = items.iter().map(|item| item.total_price).sum::<Price>();
    let final_price = match new_order.final_price {
        Some(price) if price != total => {
            tracing::warn!(%price, %total, cart_id = %cart.id, "Final price doesn't match cart");
            return Err(ValidationErrors::single(
                "finalPrice",
                "Final price doesn't match the cart total",
            )
            .into());
        }
        Some(price) => price,
        None => total,
    };
    if final_price.amount() > MAX_FINAL_PRICE {
        return Err(
            ValidationErrors::single("finalPrice", "Final price can't exceed 10,000").into(),
        );
    }

    let order = Order {
        id: OrderId::generate(),
        final_price,
        delivery_city: new_order.delivery_city,
        delivery_street: new_order.delivery_street,
        delivery_date: new_order.delivery_date,
        credit_card: new_order.credit_card,
        user_id,
        cart_id: cart.id,
        order_date: Utc::now(),
    };
    // Claim the cart before writing the order; only one checkout wins.
    carts.close(&cart).await.map_err(|e| match e {
        RepositoryError::Conflict(_) => AppError::Conflict("Cart is already ordered".to_string()),
        other => other.into(),
    })?;
    if let Err(e) = OrderRepository::new(state.store()).create(&order).await {
        if let Err(reopen) = carts.reopen(&cart).await {
            tracing::error!(cart_id = %cart.id, error = %reopen, "Failed to reopen cart");
        }
        return Err(e.into());
    }

    tracing::info!(
        order_id = %order.id,
        user_id = %user_id,
        final_price = %order.final_price,
        card = %order.credit_card.last_four(),
        "Order placed"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// One order with its user and cart resolved.
///
/// GET /api/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let order = OrderRepository::new(state.store())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !caller.can_access(order.user_id) {
        return Err(AppError::Forbidden(
            "You can only access your own orders".to_string(),
        ));
    }

    let user = UserRepository::new(state.store())
        .get_by_id(order.user_id)
        .await?
        .map(|stored| stored.user);
    let cart = CartRepository::new(state.store())
        .get(order.cart_id)
        .await?;

    Ok(Json(OrderView { order, user, cart }))
}

/// Number of orders placed.
///
/// GET /api/orders/count
pub async fn count(State(state): State<AppState>) -> Result<Json<u64>> {
    let count = OrderRepository::new(state.store()).count().await?;
    Ok(Json(count))
}
