//! Cart and cart item repository.

use shopfront_core::models::{Cart, CartItem};
use shopfront_core::{CartId, ProductId, UserId};

use super::{Collection, DocumentStore, RepositoryError, decode, decode_all, encode};

/// Repository for carts and their items.
pub struct CartRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// One cart by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or the document is corrupt.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        self.store
            .get(Collection::Carts, id.as_uuid())
            .await?
            .map(|d| decode(Collection::Carts, d))
            .transpose()
    }

    /// The user's open cart, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or a document is corrupt.
    pub async fn open_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let documents = self
            .store
            .find_by(Collection::Carts, "userId", &user_id.to_string())
            .await?;
        let carts: Vec<Cart> = decode_all(Collection::Carts, documents)?;
        Ok(carts.into_iter().rev().find(|c| c.is_open))
    }

    /// Insert a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken.
    pub async fn create(&self, cart: &Cart) -> Result<(), RepositoryError> {
        self.store
            .insert(Collection::Carts, cart.id.as_uuid(), encode(cart)?)
            .await
    }

    /// Mark an open cart as ordered.
    ///
    /// The write only lands while the stored cart is still open, so of two
    /// concurrent checkouts exactly one gets the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the cart is missing or already
    /// closed.
    pub async fn close(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
        let closed = Cart {
            is_open: false,
            ..cart.clone()
        };
        let swapped = self
            .store
            .replace_if(
                Collection::Carts,
                closed.id.as_uuid(),
                "isOpen",
                "true",
                encode(&closed)?,
            )
            .await?;
        if !swapped {
            return Err(RepositoryError::Conflict(format!(
                "cart {} is not open",
                closed.id
            )));
        }
        Ok(closed)
    }

    /// Reopen a cart closed by [`Self::close`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart doesn't exist.
    pub async fn reopen(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let open = Cart {
            is_open: true,
            ..cart.clone()
        };
        self.store
            .replace(Collection::Carts, open.id.as_uuid(), encode(&open)?)
            .await
    }

    /// Items in a cart, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails or a document is corrupt.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let documents = self
            .store
            .find_by(Collection::CartItems, "cartId", &cart_id.to_string())
            .await?;
        decode_all(Collection::CartItems, documents)
    }

    /// Put an item into its cart, replacing any line for the same product.
    /// Returns the stored line, which keeps the id of a replaced one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn put_item(&self, item: &CartItem) -> Result<CartItem, RepositoryError> {
        let existing = self
            .items(item.cart_id)
            .await?
            .into_iter()
            .find(|i| i.product_id == item.product_id);

        match existing {
            Some(line) => {
                let replaced = CartItem {
                    id: line.id,
                    ..item.clone()
                };
                self.store
                    .replace(Collection::CartItems, line.id.as_uuid(), encode(&replaced)?)
                    .await?;
                Ok(replaced)
            }
            None => {
                self.store
                    .insert(Collection::CartItems, item.id.as_uuid(), encode(item)?)
                    .await?;
                Ok(item.clone())
            }
        }
    }

    /// Remove the line for `product_id`. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let line = self
            .items(cart_id)
            .await?
            .into_iter()
            .find(|i| i.product_id == product_id);

        match line {
            Some(line) => {
                self.store
                    .delete(Collection::CartItems, line.id.as_uuid())
                    .await
            }
            None => Ok(false),
        }
    }
}
