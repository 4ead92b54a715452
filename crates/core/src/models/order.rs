//! Orders placed at checkout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Cart, User};
use crate::{CartId, City, CreditCard, OrderId, Price, UserId};

/// A placed order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub final_price: Price,
    pub delivery_city: City,
    pub delivery_street: String,
    pub delivery_date: NaiveDate,
    pub credit_card: CreditCard,
    pub user_id: UserId,
    pub cart_id: CartId,
    pub order_date: DateTime<Utc>,
}

/// An order with its `user` and `cart` references resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub user: Option<User>,
    pub cart: Option<Cart>,
}

/// Checkout payload.
///
/// `final_price` may be left out, in which case the server totals the cart.
/// `user_id` defaults to the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_price: Option<Price>,
    pub delivery_city: City,
    pub delivery_street: String,
    pub delivery_date: NaiveDate,
    pub credit_card: CreditCard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub cart_id: CartId,
}
