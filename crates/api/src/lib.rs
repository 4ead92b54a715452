//! Shopfront API library.
//!
//! REST API over a schema-validated document store. Exposed as a library so
//! the router can be exercised in tests and embedded by the integration
//! test harness.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use config::{ApiConfig, StoreBackend};
use db::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use state::AppState;

/// Error opening the configured document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreInitError {
    #[error("SHOPFRONT_DATABASE_URL is required for the postgres store")]
    MissingDatabaseUrl,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Open the document store selected by `config`.
///
/// # Errors
///
/// Returns `StoreInitError` if the `PostgreSQL` pool cannot be created.
pub async fn open_store(config: &ApiConfig) -> Result<Arc<dyn DocumentStore>, StoreInitError> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_ref()
                .ok_or(StoreInitError::MissingDatabaseUrl)?;
            let pool = db::create_pool(url).await?;
            tracing::info!("Database pool created");
            Ok(Arc::new(PgDocumentStore::new(pool)))
        }
    }
}

/// Build the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config());
    let images_dir = state.images().dir().to_path_buf();

    Router::new()
        .merge(routes::routes(&images_dir))
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS for the single-page client when it is served from another origin.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(std::time::Duration::from_secs(60 * 60));

    match config
        .cors_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => layer.allow_origin(origin),
        None => layer,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use shopfront_core::models::Category;
    use shopfront_core::{CategoryId, Role};

    use super::*;
    use crate::db::{CategoryRepository, Collection, RepositoryError, UserRepository};

    const BOUNDARY: &str = "shopfront-boundary";

    /// Memory store whose inserts into one collection fail while `failing` is set.
    struct FlakyStore {
        inner: MemoryDocumentStore,
        collection: Collection,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn failing_on(collection: Collection) -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryDocumentStore::new(),
                collection,
                failing: AtomicBool::new(true),
            })
        }
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn insert(
            &self,
            collection: Collection,
            id: Uuid,
            document: Value,
        ) -> Result<(), RepositoryError> {
            if collection == self.collection && self.failing.load(Ordering::SeqCst) {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            self.inner.insert(collection, id, document).await
        }

        async fn replace(
            &self,
            collection: Collection,
            id: Uuid,
            document: Value,
        ) -> Result<(), RepositoryError> {
            self.inner.replace(collection, id, document).await
        }

        async fn replace_if(
            &self,
            collection: Collection,
            id: Uuid,
            field: &str,
            expected: &str,
            document: Value,
        ) -> Result<bool, RepositoryError> {
            self.inner
                .replace_if(collection, id, field, expected, document)
                .await
        }

        async fn get(
            &self,
            collection: Collection,
            id: Uuid,
        ) -> Result<Option<Value>, RepositoryError> {
            self.inner.get(collection, id).await
        }

        async fn list(&self, collection: Collection) -> Result<Vec<Value>, RepositoryError> {
            self.inner.list(collection).await
        }

        async fn find_by(
            &self,
            collection: Collection,
            field: &str,
            value: &str,
        ) -> Result<Vec<Value>, RepositoryError> {
            self.inner.find_by(collection, field, value).await
        }

        async fn count(&self, collection: Collection) -> Result<u64, RepositoryError> {
            self.inner.count(collection).await
        }

        async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError> {
            self.inner.delete(collection, id).await
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            self.inner.ping().await
        }
    }

    struct Harness {
        state: AppState,
        _uploads: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_store(Arc::new(MemoryDocumentStore::new()))
        }

        fn with_store(store: Arc<dyn DocumentStore>) -> Self {
            let uploads = tempfile::tempdir().unwrap();
            let config = ApiConfig::local(uploads.path().to_path_buf());
            let state = AppState::new(config, store);
            Self {
                state,
                _uploads: uploads,
            }
        }

        fn stored_images(&self) -> usize {
            std::fs::read_dir(self.state.images().dir()).map_or(0, Iterator::count)
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = app(self.state.clone()).oneshot(request).await.unwrap();
            let status = response.status();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
            (status, value)
        }

        async fn json(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("authorization", format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            self.send(request).await
        }

        async fn register(&self, username: &str) -> (String, Value) {
            let (status, body) = self
                .json(
                    "POST",
                    "/api/auth/register",
                    None,
                    Some(json!({
                        "idNumber": "123456789",
                        "username": username,
                        "password": "secret1",
                        "firstName": "Dana",
                        "lastName": "Levi",
                        "city": "Haifa",
                        "street": "Herzl 5"
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            (body["token"].as_str().unwrap().to_string(), body["user"].clone())
        }

        async fn admin_token(&self) -> String {
            self.register("admin").await;
            UserRepository::new(self.state.store())
                .set_role("admin", Role::Admin)
                .await
                .unwrap();
            let (status, body) = self
                .json(
                    "POST",
                    "/api/auth/login",
                    None,
                    Some(json!({ "username": "admin", "password": "secret1" })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            body["token"].as_str().unwrap().to_string()
        }

        async fn category(&self) -> CategoryId {
            let category = Category {
                id: CategoryId::generate(),
                name: "Dairy".to_string(),
            };
            CategoryRepository::new(self.state.store())
                .create(&category)
                .await
                .unwrap();
            category.id
        }

        async fn upload_product(
            &self,
            token: &str,
            fields: &[(&str, &str)],
            image: Option<&str>,
        ) -> (StatusCode, Value) {
            let mut body = String::new();
            for (name, value) in fields {
                body.push_str(&format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                ));
            }
            if let Some(file_name) = image {
                body.push_str(&format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n"
                ));
            }
            body.push_str(&format!("--{BOUNDARY}--\r\n"));

            let request = Request::post("/api/products")
                .header("authorization", format!("Bearer {token}"))
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap();
            self.send(request).await
        }

        /// A shopper's cart holding two loaves at 7.5. Returns the shopper's
        /// token, user id and cart id.
        async fn filled_cart(&self) -> (String, String, String) {
            let admin = self.admin_token().await;
            let category = self.category().await;
            let (status, product) = self
                .upload_product(
                    &admin,
                    &[("name", "Bread"), ("price", "7.5"), ("categoryId", &category.to_string())],
                    Some("bread.jpg"),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{product}");

            let (token, user) = self.register("shopper").await;
            let (_, cart) = self.json("POST", "/api/carts", Some(&token), None).await;
            let cart_id = cart["_id"].as_str().unwrap().to_string();
            let (status, item) = self
                .json(
                    "POST",
                    &format!("/api/carts/{cart_id}/items"),
                    Some(&token),
                    Some(json!({ "productId": product["_id"], "quantity": 2 })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{item}");

            let user_id = user["_id"].as_str().unwrap().to_string();
            (token, user_id, cart_id)
        }

        async fn place_order(
            &self,
            token: &str,
            cart_id: &str,
            extra: Value,
        ) -> (StatusCode, Value) {
            let mut body = json!({
                "deliveryCity": "Haifa",
                "deliveryStreet": "Herzl 5",
                "deliveryDate": "2026-11-01",
                "creditCard": "12345678901234",
                "cartId": cart_id
            });
            if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
                body.extend(extra);
            }
            self.json("POST", "/api/orders", Some(token), Some(body)).await
        }
    }

    #[tokio::test]
    async fn test_health() {
        let harness = Harness::new();
        let (status, body) = harness.json("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".to_string()));

        let (status, _) = harness.json("GET", "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_validation_is_structured() {
        let harness = Harness::new();
        let (status, body) = harness
            .json(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "username": "dana" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors = body["errors"].as_array().unwrap();
        assert!(errors.iter().any(|e| e["field"] == "idNumber"));
        assert!(errors.iter().any(|e| e["message"] == "Missing password"));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let harness = Harness::new();
        harness.register("dana").await;
        let (status, _) = harness
            .json(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "username": "dana", "password": "nope" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let harness = Harness::new();
        let (token, _) = harness.register("dana").await;

        let (status, _) = harness.json("POST", "/api/carts", Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = harness
            .json("POST", "/api/auth/logout", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = harness.json("POST", "/api/carts", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, Value::String("You are not logged in".to_string()));
    }

    #[tokio::test]
    async fn test_product_create_requires_admin() {
        let harness = Harness::new();
        let (token, _) = harness.register("dana").await;
        let category = harness.category().await;

        let (status, body) = harness
            .upload_product(
                &token,
                &[("name", "Milk"), ("price", "5.9"), ("categoryId", &category.to_string())],
                Some("milk.png"),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, Value::String("You are not an Admin!".to_string()));
    }

    #[tokio::test]
    async fn test_admin_creates_product() {
        let harness = Harness::new();
        let token = harness.admin_token().await;
        let category = harness.category().await;

        let (status, body) = harness
            .upload_product(
                &token,
                &[("name", " Milk "), ("price", "5.9"), ("categoryId", &category.to_string())],
                Some("milk.png"),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["name"], "Milk");
        let image_name = body["imageName"].as_str().unwrap().to_string();
        assert!(image_name.ends_with(".png"));

        let (status, count) = harness.json("GET", "/api/products/count", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count, json!(1));

        let (status, image) = harness
            .json("GET", &format!("/api/products/images/{image_name}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(image, Value::String("PNGDATA".to_string()));
    }

    #[tokio::test]
    async fn test_product_price_limit() {
        let harness = Harness::new();
        let token = harness.admin_token().await;
        let category = harness.category().await;

        let (status, body) = harness
            .upload_product(
                &token,
                &[("name", "Caviar"), ("price", "1001"), ("categoryId", &category.to_string())],
                Some("caviar.jpg"),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["message"], "Price can't exceed 1,000");
    }

    #[tokio::test]
    async fn test_checkout_computes_final_price_and_closes_cart() {
        let harness = Harness::new();
        let admin = harness.admin_token().await;
        let category = harness.category().await;
        let (_, product) = harness
            .upload_product(
                &admin,
                &[("name", "Bread"), ("price", "7.5"), ("categoryId", &category.to_string())],
                Some("bread.jpg"),
            )
            .await;

        let (token, user) = harness.register("shopper").await;
        let (status, cart) = harness.json("POST", "/api/carts", Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);
        let cart_id = cart["_id"].as_str().unwrap().to_string();

        let (status, item) = harness
            .json(
                "POST",
                &format!("/api/carts/{cart_id}/items"),
                Some(&token),
                Some(json!({ "productId": product["_id"], "quantity": 2 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{item}");
        assert_eq!(item["totalPrice"], "15.0");

        let (status, order) = harness
            .json(
                "POST",
                "/api/orders",
                Some(&token),
                Some(json!({
                    "deliveryCity": "Haifa",
                    "deliveryStreet": "Herzl 5",
                    "deliveryDate": "2026-11-01",
                    "creditCard": "12345678901234",
                    "cartId": cart_id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{order}");
        assert_eq!(order["finalPrice"], "15.0");
        assert_eq!(order["userId"], user["_id"]);

        let (status, view) = harness
            .json(
                "GET",
                &format!("/api/orders/{}", order["_id"].as_str().unwrap()),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["user"]["username"], "shopper");
        assert_eq!(view["cart"]["isOpen"], false);

        let (status, open) = harness
            .json(
                "GET",
                &format!("/api/carts/by-user/{}", user["_id"].as_str().unwrap()),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(open, Value::Null);

        let (_, count) = harness.json("GET", "/api/orders/count", None, None).await;
        assert_eq!(count, json!(1));
    }

    #[tokio::test]
    async fn test_order_validation_messages() {
        let harness = Harness::new();
        let (token, _) = harness.register("shopper").await;

        let (status, body) = harness
            .json(
                "POST",
                "/api/orders",
                Some(&token),
                Some(json!({ "creditCard": "123", "finalPrice": -1 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let messages: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["message"].as_str().unwrap())
            .collect();
        assert!(messages.contains(&"Final price can't be negative"));
        assert!(messages.contains(&"Missing delivery city"));
        assert!(
            messages.contains(&"Credit card must be a minimum of 14 numbers and max 16 numbers")
        );
    }

    #[tokio::test]
    async fn test_cart_owner_only() {
        let harness = Harness::new();
        let (owner, _) = harness.register("owner").await;
        let (other, _) = harness.register("other").await;

        let (_, cart) = harness.json("POST", "/api/carts", Some(&owner), None).await;
        let cart_id = cart["_id"].as_str().unwrap();

        let (status, _) = harness
            .json("GET", &format!("/api/carts/{cart_id}/items"), Some(&other), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, items) = harness
            .json("GET", &format!("/api/carts/{cart_id}/items"), Some(&owner), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(items, json!([]));
    }

    #[tokio::test]
    async fn test_cart_is_ordered_once() {
        let harness = Harness::new();
        let (token, _, cart_id) = harness.filled_cart().await;

        let (status, order) = harness.place_order(&token, &cart_id, json!({})).await;
        assert_eq!(status, StatusCode::CREATED, "{order}");

        let (status, body) = harness.place_order(&token, &cart_id, json!({})).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, Value::String("Cart is already ordered".to_string()));

        let (_, count) = harness.json("GET", "/api/orders/count", None, None).await;
        assert_eq!(count, json!(1));
    }

    #[tokio::test]
    async fn test_failed_order_write_reopens_cart() {
        let store = FlakyStore::failing_on(Collection::Orders);
        let harness = Harness::with_store(store.clone());
        let (token, user_id, cart_id) = harness.filled_cart().await;

        let (status, _) = harness.place_order(&token, &cart_id, json!({})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (_, open) = harness
            .json("GET", &format!("/api/carts/by-user/{user_id}"), Some(&token), None)
            .await;
        assert_eq!(open["_id"], json!(cart_id));
        assert_eq!(open["isOpen"], true);
        let (_, count) = harness.json("GET", "/api/orders/count", None, None).await;
        assert_eq!(count, json!(0));

        // The same cart can be ordered once the store recovers
        store.failing.store(false, Ordering::SeqCst);
        let (status, order) = harness.place_order(&token, &cart_id, json!({})).await;
        assert_eq!(status, StatusCode::CREATED, "{order}");
    }

    #[tokio::test]
    async fn test_final_price_must_match_cart_total() {
        let harness = Harness::new();
        let (token, _, cart_id) = harness.filled_cart().await;

        let (status, body) = harness
            .place_order(&token, &cart_id, json!({ "finalPrice": 0 }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["errors"][0]["message"],
            "Final price doesn't match the cart total"
        );

        let (status, order) = harness
            .place_order(&token, &cart_id, json!({ "finalPrice": 15 }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{order}");
    }

    #[tokio::test]
    async fn test_failed_product_write_discards_image() {
        let harness = Harness::with_store(FlakyStore::failing_on(Collection::Products));
        let token = harness.admin_token().await;
        let category = harness.category().await;

        let (status, _) = harness
            .upload_product(
                &token,
                &[("name", "Milk"), ("price", "5.9"), ("categoryId", &category.to_string())],
                Some("milk.png"),
            )
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(harness.stored_images(), 0);
    }
}
