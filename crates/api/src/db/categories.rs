//! Category repository.

use shopfront_core::CategoryId;
use shopfront_core::models::Category;

use super::{Collection, DocumentStore, RepositoryError, decode, decode_all, encode};

/// Repository for product categories.
pub struct CategoryRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or a document is corrupt.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let documents = self.store.list(Collection::Categories).await?;
        decode_all(Collection::Categories, documents)
    }

    /// One category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or the document is corrupt.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        self.store
            .get(Collection::Categories, id.as_uuid())
            .await?
            .map(|d| decode(Collection::Categories, d))
            .transpose()
    }

    /// Category with exactly this name, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or a document is corrupt.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let documents = self
            .store
            .find_by(Collection::Categories, "name", name)
            .await?;
        documents
            .into_iter()
            .next()
            .map(|d| decode(Collection::Categories, d))
            .transpose()
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken.
    pub async fn create(&self, category: &Category) -> Result<(), RepositoryError> {
        self.store
            .insert(Collection::Categories, category.id.as_uuid(), encode(category)?)
            .await
    }
}
