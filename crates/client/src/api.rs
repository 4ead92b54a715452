//! HTTP access to the Shopfront API.
//!
//! Services talk to the API through the [`CatalogApi`] and [`AuthApi`]
//! traits; [`HttpApi`] implements both over `reqwest` and also exposes the
//! cart and order endpoints directly.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::models::{
    AuthResponse, Cart, CartItem, Category, Credentials, NewCartItem, NewOrder, Order, OrderView,
    Product, Registration,
};
use shopfront_core::validation::ORDER_SCHEMA;
use shopfront_core::{CartId, CategoryId, OrderId, Price, ProductId, UserId, ValidationErrors};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::state::AuthState;
use crate::store::Store;

/// An image file to upload with a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Product fields submitted by the admin forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Set when updating an existing product.
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Price,
    pub category_id: CategoryId,
    /// Required on create, optional on update.
    pub image: Option<ImageUpload>,
}

impl ProductDraft {
    /// The text fields as the JSON payload the product schema checks.
    #[must_use]
    pub fn fields(&self) -> Value {
        json!({
            "name": self.name,
            "price": self.price.to_string(),
            "categoryId": self.category_id.to_string(),
        })
    }

    fn form(&self) -> Form {
        let mut form = Form::new()
            .text("name", self.name.clone())
            .text("price", self.price.to_string())
            .text("categoryId", self.category_id.to_string());
        if let Some(id) = self.id {
            form = form.text("_id", id.to_string());
        }
        if let Some(image) = &self.image {
            form = form.part(
                "image",
                Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
            );
        }
        form
    }
}

/// Catalog endpoints used by the products service.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /api/products`
    async fn list_products(&self) -> Result<Vec<Product>, ClientError>;

    /// `GET /api/products/count`
    async fn count_products(&self) -> Result<u64, ClientError>;

    /// `GET /api/categories`
    async fn list_categories(&self) -> Result<Vec<Category>, ClientError>;

    /// `POST /api/products` (multipart)
    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ClientError>;

    /// `PUT /api/products/{id}` (multipart)
    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ClientError>;
}

/// Account endpoints used by the auth service.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/auth/register`
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError>;

    /// `POST /api/auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError>;

    /// `POST /api/auth/logout`
    async fn logout(&self) -> Result<(), ClientError>;
}

/// `reqwest` client for the API.
///
/// Requests carry the bearer token currently held in the auth store.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
    auth: Arc<Store<AuthState>>,
}

impl HttpApi {
    /// Create a client for the API at `config.api_url`.
    #[must_use]
    pub fn new(config: &ClientConfig, auth: Arc<Store<AuthState>>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: config.api_url.clone(),
            auth,
        }
    }

    /// The API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// URL of an uploaded product image.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if the name cannot form a URL.
    pub fn image_url(&self, image_name: &str) -> Result<Url, ClientError> {
        Ok(self.base.join("api/products/images/")?.join(image_name)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base.join(path)?;
        let builder = self.client.request(method, url);
        Ok(match &self.auth.state().token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = check(builder.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn execute(builder: RequestBuilder) -> Result<(), ClientError> {
        check(builder.send().await?).await?;
        Ok(())
    }

    // =========================================================================
    // Carts
    // =========================================================================

    /// Open a cart for the logged-in user, or get the one already open.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    pub async fn open_cart(&self) -> Result<Cart, ClientError> {
        Self::fetch(self.request(Method::POST, "api/carts")?).await
    }

    /// The open cart of `user_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    pub async fn cart_by_user(&self, user_id: UserId) -> Result<Option<Cart>, ClientError> {
        Self::fetch(self.request(Method::GET, &format!("api/carts/by-user/{user_id}"))?).await
    }

    /// Lines of a cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    pub async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>, ClientError> {
        Self::fetch(self.request(Method::GET, &format!("api/carts/{cart_id}/items"))?).await
    }

    /// Add a product to a cart, replacing its existing line.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    pub async fn add_cart_item(
        &self,
        cart_id: CartId,
        item: &NewCartItem,
    ) -> Result<CartItem, ClientError> {
        let builder = self
            .request(Method::POST, &format!("api/carts/{cart_id}/items"))?
            .json(item);
        Self::fetch(builder).await
    }

    /// Remove a product's line from a cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    pub async fn remove_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), ClientError> {
        Self::execute(self.request(
            Method::DELETE,
            &format!("api/carts/{cart_id}/items/{product_id}"),
        )?)
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Check out a cart. The order is checked against the order schema before
    /// it is sent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the order fails the schema, or
    /// another `ClientError` if the request fails or is rejected.
    #[instrument(skip_all, fields(cart_id = %order.cart_id))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<Order, ClientError> {
        let payload = serde_json::to_value(order)
            .map_err(|e| ValidationErrors::single("orders", e.to_string()))?;
        ORDER_SCHEMA.validate(&payload)?;

        Self::fetch(self.request(Method::POST, "api/orders")?.json(&payload)).await
    }

    /// One order with its user and cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    pub async fn get_order(&self, id: OrderId) -> Result<OrderView, ClientError> {
        Self::fetch(self.request(Method::GET, &format!("api/orders/{id}"))?).await
    }

    /// Number of orders placed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    pub async fn count_orders(&self) -> Result<u64, ClientError> {
        Self::fetch(self.request(Method::GET, "api/orders/count")?).await
    }
}

/// Turn a non-success response into an error.
///
/// 400 responses carrying a validation body become `ClientError::Validation`.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::BAD_REQUEST
        && let Ok(errors) = serde_json::from_str::<ValidationErrors>(&body)
    {
        return Err(ClientError::Validation(errors));
    }

    debug!(status = status.as_u16(), body = %body, "API request rejected");
    Err(ClientError::Status {
        status: status.as_u16(),
        message: body,
    })
}

#[async_trait]
impl CatalogApi for HttpApi {
    async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        Self::fetch(self.request(Method::GET, "api/products")?).await
    }

    async fn count_products(&self) -> Result<u64, ClientError> {
        Self::fetch(self.request(Method::GET, "api/products/count")?).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        Self::fetch(self.request(Method::GET, "api/categories")?).await
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ClientError> {
        Self::fetch(
            self.request(Method::POST, "api/products")?
                .multipart(draft.form()),
        )
        .await
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ClientError> {
        Self::fetch(
            self.request(Method::PUT, &format!("api/products/{id}"))?
                .multipart(draft.form()),
        )
        .await
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError> {
        Self::fetch(
            self.request(Method::POST, "api/auth/register")?
                .json(registration),
        )
        .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError> {
        Self::fetch(
            self.request(Method::POST, "api/auth/login")?
                .json(credentials),
        )
        .await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        Self::execute(self.request(Method::POST, "api/auth/logout")?).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api() -> HttpApi {
        let config = ClientConfig::with_api_url("http://127.0.0.1:3030").unwrap();
        HttpApi::new(&config, Arc::new(Store::new()))
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            api().image_url("abc.png").unwrap().as_str(),
            "http://127.0.0.1:3030/api/products/images/abc.png"
        );
    }

    #[test]
    fn test_request_carries_bearer_token() {
        let api = api();
        let request = api
            .request(Method::GET, "api/products")
            .unwrap()
            .build()
            .unwrap();
        assert!(request.headers().get("authorization").is_none());

        api.auth.dispatch(crate::state::AuthAction::Login(AuthResponse {
            token: "tok".to_string(),
            user: serde_json::from_value(json!({
                "_id": "5f0c8a8e-4d57-4e5e-9a43-31c0d3d9b0a1",
                "idNumber": "123456789",
                "username": "dana",
                "firstName": "Dana",
                "lastName": "Levi",
                "city": "Haifa",
                "street": "Herzl 5"
            }))
            .unwrap(),
        }));
        let request = api
            .request(Method::GET, "api/products")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers().get("authorization").unwrap(), "Bearer tok");
    }

    #[test]
    fn test_draft_fields_match_schema_shape() {
        let draft = ProductDraft {
            id: None,
            name: "Milk".to_string(),
            price: "5.9".parse().unwrap(),
            category_id: CategoryId::generate(),
            image: None,
        };
        let fields = draft.fields();
        assert_eq!(fields["name"], "Milk");
        assert_eq!(fields["price"], "5.90");
        assert!(shopfront_core::validation::PRODUCT_SCHEMA.validate(&fields).is_ok());
    }
}
