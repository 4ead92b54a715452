//! Category route handlers.

use axum::{Json, extract::State};

use shopfront_core::models::Category;

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::state::AppState;

/// List all categories.
///
/// GET /api/categories
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.store()).list().await?;
    Ok(Json(categories))
}
