//! Shopfront Core - Shared types library.
//!
//! This crate provides the document types and schema validation used across
//! all Shopfront components:
//! - `api` - REST API over the document store
//! - `client` - Typed client with state containers and services
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types, schemas and pure validation - no I/O,
//! no database access, no HTTP clients. Both tiers validate against the same
//! schema tables, so a payload the client accepts is judged by the same rules
//! on the server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, roles, cities, credit cards
//! - [`models`] - Document shapes (order, cart, product, category, user)
//! - [`validation`] - Data-driven field constraint tables

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldError, Schema, ValidationErrors};
