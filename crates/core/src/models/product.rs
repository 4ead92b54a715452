//! Catalog products.

use serde::{Deserialize, Serialize};

use crate::{CategoryId, Price, ProductId};

/// A product as stored and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category_id: CategoryId,
    /// File name of the uploaded image, served under `/api/products/images/`.
    pub image_name: String,
}
