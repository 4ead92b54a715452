//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod city;
pub mod credit_card;
pub mod id;
pub mod price;
pub mod role;

pub use city::City;
pub use credit_card::{CreditCard, CreditCardError};
pub use id::*;
pub use price::Price;
pub use role::Role;
