//! Product repository.

use shopfront_core::ProductId;
use shopfront_core::models::Product;

use super::{Collection, DocumentStore, RepositoryError, decode, decode_all, encode};

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// All products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or a document is corrupt.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let documents = self.store.list(Collection::Products).await?;
        decode_all(Collection::Products, documents)
    }

    /// Number of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        self.store.count(Collection::Products).await
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or the document is corrupt.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.store
            .get(Collection::Products, id.as_uuid())
            .await?
            .map(|d| decode(Collection::Products, d))
            .transpose()
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken.
    pub async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        self.store
            .insert(Collection::Products, product.id.as_uuid(), encode(product)?)
            .await
    }

    /// Replace an existing product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        self.store
            .replace(Collection::Products, product.id.as_uuid(), encode(product)?)
            .await
    }
}
