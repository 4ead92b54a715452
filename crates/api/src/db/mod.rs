//! Document store and typed repositories.
//!
//! # Collections
//!
//! - `orders` - Placed orders (immutable)
//! - `carts` - One open cart per user at a time
//! - `cart_items` - Product lines, keyed to a cart
//! - `users` - Accounts, with Argon2 password hashes
//! - `products` - Catalog
//! - `categories` - Product categories
//!
//! Documents are stored as JSON in their wire shape (`_id`, camelCase).
//! Schema validation happens before a document reaches the store; the store
//! only enforces identity and the unique username.
//!
//! # Backends
//!
//! - [`PgDocumentStore`] - one `documents` table in `PostgreSQL`
//! - [`MemoryDocumentStore`] - in-process, for local runs and tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p shopfront-cli -- migrate
//! ```

pub mod carts;
pub mod categories;
mod memory;
pub mod orders;
mod postgres;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use memory::MemoryDocumentStore;
pub use orders::OrderRepository;
pub use postgres::PgDocumentStore;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A named collection of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Orders,
    Carts,
    CartItems,
    Users,
    Products,
    Categories,
}

impl Collection {
    /// Collection name as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Carts => "carts",
            Self::CartItems => "cart_items",
            Self::Users => "users",
            Self::Products => "products",
            Self::Categories => "categories",
        }
    }

    /// Top-level fields whose values must be unique within the collection.
    #[must_use]
    pub const fn unique_fields(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["username"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence for JSON documents grouped into collections.
///
/// `list` and `find_by` return documents in insertion order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document.
    ///
    /// Returns `RepositoryError::Conflict` if the id or a unique field is taken.
    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), RepositoryError>;

    /// Replace an existing document.
    ///
    /// Returns `RepositoryError::NotFound` if there is no such document.
    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), RepositoryError>;

    /// Replace a document only while its top-level `field` still reads
    /// `expected` (compared as text). Returns whether the write happened.
    async fn replace_if(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        expected: &str,
        document: Value,
    ) -> Result<bool, RepositoryError>;

    /// Fetch one document by id.
    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, RepositoryError>;

    /// All documents in a collection.
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, RepositoryError>;

    /// Documents whose top-level string `field` equals `value`.
    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>, RepositoryError>;

    /// Number of documents in a collection.
    async fn count(&self, collection: Collection) -> Result<u64, RepositoryError>;

    /// Delete one document. Returns whether it existed.
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Serialize a typed document into its stored form.
pub(crate) fn encode<T: Serialize>(document: &T) -> Result<Value, RepositoryError> {
    serde_json::to_value(document)
        .map_err(|e| RepositoryError::DataCorruption(format!("failed to encode document: {e}")))
}

/// Deserialize a stored document.
pub(crate) fn decode<T: DeserializeOwned>(
    collection: Collection,
    document: Value,
) -> Result<T, RepositoryError> {
    serde_json::from_value(document).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid document in {collection}: {e}"))
    })
}

/// Deserialize every stored document.
pub(crate) fn decode_all<T: DeserializeOwned>(
    collection: Collection,
    documents: Vec<Value>,
) -> Result<Vec<T>, RepositoryError> {
    documents
        .into_iter()
        .map(|d| decode(collection, d))
        .collect()
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
