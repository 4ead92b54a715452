//! Product route handlers.
//!
//! Create and update take `multipart/form-data` with text fields `name`,
//! `price`, `categoryId` and a file field `image`.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::instrument;

use shopfront_core::models::Product;
use shopfront_core::validation::PRODUCT_SCHEMA;
use shopfront_core::{CategoryId, Price, ProductId, ValidationErrors};

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Validated product fields from a form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductFields {
    name: String,
    price: Price,
    category_id: CategoryId,
}

/// An uploaded file.
struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// A parsed product form.
struct ProductForm {
    fields: Value,
    image: Option<Upload>,
}

async fn read_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut fields = Map::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if !bytes.is_empty() {
                image = Some(Upload { file_name, bytes });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            fields.insert(name, Value::String(text));
        }
    }

    Ok(ProductForm {
        fields: Value::Object(fields),
        image,
    })
}

/// Validate form fields and check the category exists.
async fn validate_fields(state: &AppState, fields: &Value) -> Result<ProductFields> {
    let parsed: ProductFields = PRODUCT_SCHEMA.parse(fields)?;

    if CategoryRepository::new(state.store())
        .get(parsed.category_id)
        .await?
        .is_none()
    {
        return Err(ValidationErrors::single("categoryId", "Category does not exist").into());
    }

    Ok(parsed)
}

/// List all products.
///
/// GET /api/products
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.store()).list().await?;
    Ok(Json(products))
}

/// Number of products.
///
/// GET /api/products/count
pub async fn count(State(state): State<AppState>) -> Result<Json<u64>> {
    let count = ProductRepository::new(state.store()).count().await?;
    Ok(Json(count))
}

/// One product.
///
/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.store())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Create a product with its image.
///
/// POST /api/products
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let form = read_form(multipart).await?;
    let fields = validate_fields(&state, &form.fields).await?;
    let image = form
        .image
        .ok_or_else(|| ValidationErrors::single("image", "Missing image"))?;

    let image_name = state.images().save(&image.file_name, &image.bytes).await?;

    let product = Product {
        id: ProductId::generate(),
        name: fields.name,
        price: fields.price,
        category_id: fields.category_id,
        image_name,
    };
    if let Err(e) = ProductRepository::new(state.store()).create(&product).await {
        state.images().remove(&product.image_name).await;
        return Err(e.into());
    }

    tracing::info!(product_id = %product.id, admin = %admin.username, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product. The image is kept unless a new one is uploaded.
///
/// PUT /api/products/{id}
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let products = ProductRepository::new(state.store());
    let existing = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let form = read_form(multipart).await?;
    let fields = validate_fields(&state, &form.fields).await?;

    let image_name = match form.image {
        Some(image) => state.images().save(&image.file_name, &image.bytes).await?,
        None => existing.image_name.clone(),
    };

    let product = Product {
        id,
        name: fields.name,
        price: fields.price,
        category_id: fields.category_id,
        image_name,
    };
    if let Err(e) = products.update(&product).await {
        if product.image_name != existing.image_name {
            state.images().remove(&product.image_name).await;
        }
        return Err(e.into());
    }

    if product.image_name != existing.image_name {
        state.images().remove(&existing.image_name).await;
    }

    tracing::info!(product_id = %id, admin = %admin.username, "Product updated");
    Ok(Json(product))
}
