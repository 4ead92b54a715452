//! Document shapes shared by the API and the client.
//!
//! Wire format is camelCase JSON with `_id` identifiers.

pub mod auth;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use auth::{AuthResponse, Credentials};
pub use cart::{Cart, CartItem, NewCartItem};
pub use category::Category;
pub use order::{NewOrder, Order, OrderView};
pub use product::Product;
pub use user::{Registration, User};
