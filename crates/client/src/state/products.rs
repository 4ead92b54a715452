//! Products store.

use shopfront_core::models::Product;

use crate::store::Reducer;

/// Cached product catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductsState {
    pub products: Vec<Product>,
    /// Set once a full listing has been fetched.
    pub loaded: bool,
}

/// Changes to the products store.
#[derive(Debug, Clone)]
pub enum ProductsAction {
    /// Replace the catalog with a full listing.
    FetchProducts(Vec<Product>),
    /// Append a newly created product.
    AddProduct(Product),
    /// Replace the product with the same id.
    UpdateProduct(Product),
    /// Drop the cache so the next read refetches.
    Invalidate,
}

impl Reducer for ProductsState {
    type Action = ProductsAction;

    fn reduce(&mut self, action: ProductsAction) {
        match action {
            ProductsAction::FetchProducts(products) => {
                self.products = products;
                self.loaded = true;
            }
            ProductsAction::AddProduct(product) => self.products.push(product),
            ProductsAction::UpdateProduct(product) => {
                if let Some(slot) = self.products.iter_mut().find(|p| p.id == product.id) {
                    *slot = product;
                }
            }
            ProductsAction::Invalidate => *self = Self::default(),
        }
    }
}
