//! Order repository.

use shopfront_core::OrderId;
use shopfront_core::models::Order;

use super::{Collection, DocumentStore, RepositoryError, decode, encode};

/// Repository for placed orders. Orders are never updated.
pub struct OrderRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// One order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or the document is corrupt.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.store
            .get(Collection::Orders, id.as_uuid())
            .await?
            .map(|d| decode(Collection::Orders, d))
            .transpose()
    }

    /// Number of orders placed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        self.store.count(Collection::Orders).await
    }

    /// Insert a new order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken.
    pub async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        self.store
            .insert(Collection::Orders, order.id.as_uuid(), encode(order)?)
            .await
    }
}
