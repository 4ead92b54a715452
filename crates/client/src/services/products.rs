//! Catalog service.
//!
//! Product and category listings are fetched at most once and then served
//! from their stores until [`ProductsService::invalidate`] is called.
//! Creates and updates go to the API first and reach the store only once the
//! server has confirmed them.

use std::sync::Arc;

use tracing::{debug, instrument};

use shopfront_core::models::{Category, Product};
use shopfront_core::validation::PRODUCT_SCHEMA;
use shopfront_core::{ProductId, ValidationErrors};

use crate::api::{CatalogApi, ProductDraft};
use crate::error::ClientError;
use crate::state::{CategoriesAction, CategoriesState, ProductsAction, ProductsState};
use crate::store::Store;

/// Products and categories, cached in their stores.
pub struct ProductsService<A: ?Sized> {
    api: Arc<A>,
    products: Arc<Store<ProductsState>>,
    categories: Arc<Store<CategoriesState>>,
}

impl<A: ?Sized> Clone for ProductsService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            products: Arc::clone(&self.products),
            categories: Arc::clone(&self.categories),
        }
    }
}

impl<A: CatalogApi + ?Sized> ProductsService<A> {
    #[must_use]
    pub const fn new(
        api: Arc<A>,
        products: Arc<Store<ProductsState>>,
        categories: Arc<Store<CategoriesState>>,
    ) -> Self {
        Self {
            api,
            products,
            categories,
        }
    }

    /// All products, fetched on first use.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the listing has to be fetched and the fetch
    /// fails. The store is left untouched in that case.
    pub async fn get_all_products(&self) -> Result<Vec<Product>, ClientError> {
        let cached = self.products.state();
        if cached.loaded {
            return Ok(cached.products.clone());
        }

        let products = self.api.list_products().await?;
        debug!(count = products.len(), "Fetched products");
        self.products
            .dispatch(ProductsAction::FetchProducts(products));
        Ok(self.products.state().products.clone())
    }

    /// Number of products on the server. Never cached.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    pub async fn count_products(&self) -> Result<u64, ClientError> {
        self.api.count_products().await
    }

    /// All categories, fetched on first use.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the listing has to be fetched and the fetch
    /// fails.
    pub async fn get_all_categories(&self) -> Result<Vec<Category>, ClientError> {
        let cached = self.categories.state();
        if cached.loaded {
            return Ok(cached.categories.clone());
        }

        let categories = self.api.list_categories().await?;
        debug!(count = categories.len(), "Fetched categories");
        self.categories
            .dispatch(CategoriesAction::FetchCategories(categories));
        Ok(self.categories.state().categories.clone())
    }

    /// Create a product and append the server's copy to the store.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the draft fails the product
    /// schema or has no image, otherwise whatever the API call returns.
    #[instrument(skip_all, fields(name = %draft.name))]
    pub async fn add_product(&self, draft: &ProductDraft) -> Result<Product, ClientError> {
        PRODUCT_SCHEMA.validate(&draft.fields())?;
        if draft.image.is_none() {
            return Err(ValidationErrors::single("image", "Missing image").into());
        }

        let product = self.api.create_product(draft).await?;
        self.products
            .dispatch(ProductsAction::AddProduct(product.clone()));
        Ok(product)
    }

    /// Replace a product and swap the server's copy into the store.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the draft fails the product
    /// schema, otherwise whatever the API call returns.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ClientError> {
        PRODUCT_SCHEMA.validate(&draft.fields())?;

        let draft = ProductDraft {
            id: Some(id),
            ..draft.clone()
        };
        let product = self.api.update_product(id, &draft).await?;
        self.products
            .dispatch(ProductsAction::UpdateProduct(product.clone()));
        Ok(product)
    }

    /// Forget cached listings so the next reads go to the server.
    pub fn invalidate(&self) {
        self.products.dispatch(ProductsAction::Invalidate);
        self.categories.dispatch(CategoriesAction::Invalidate);
    }
}
